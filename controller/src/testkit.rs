use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};

use darkroom_common::{Button, SensorError};

use crate::{
    error::{HardwareError, Shutdown},
    hal::{Clock, Display, Input, Led, LedBank, Relay, TemperatureProbe},
};

#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }
}

pub struct ScriptedInput {
    clock: Arc<ManualClock>,
    holds: Vec<(Button, u64, u64)>,
    turns: Vec<(u64, i32)>,
    knob: Vec<(u64, u64)>,
    interrupt: Option<(u64, Shutdown)>,
    released: Arc<AtomicBool>,
}

impl ScriptedInput {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            holds: Vec::new(),
            turns: Vec::new(),
            knob: Vec::new(),
            interrupt: None,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn hold(mut self, button: Button, from_ms: u64, to_ms: u64) -> Self {
        self.holds.push((button, from_ms, to_ms));
        self
    }

    pub fn tap(self, button: Button, at_ms: u64) -> Self {
        self.hold(button, at_ms, at_ms + 100)
    }

    pub fn turn(mut self, at_ms: u64, steps: i32) -> Self {
        self.turns.push((at_ms, steps));
        self
    }

    pub fn knob(mut self, at_ms: u64) -> Self {
        self.knob.push((at_ms, at_ms + 100));
        self
    }

    pub fn interrupt_at(mut self, at_ms: u64, shutdown: Shutdown) -> Self {
        self.interrupt = Some((at_ms, shutdown));
        self
    }

    pub fn released_flag(&self) -> Arc<AtomicBool> {
        self.released.clone()
    }

    fn now(&self) -> u64 {
        let now = self.clock.now_ms();
        if let Some((at, shutdown)) = &self.interrupt {
            if now >= *at {
                shutdown.request();
            }
        }
        now
    }
}

impl Input for ScriptedInput {
    fn button_pressed(&mut self, button: Button) -> bool {
        let now = self.now();
        self.holds
            .iter()
            .any(|(held, from, to)| *held == button && (*from..*to).contains(&now))
    }

    fn encoder_delta(&mut self) -> i32 {
        let now = self.now();
        let mut delta = 0;
        self.turns.retain(|(at, steps)| {
            if *at <= now {
                delta += steps;
                false
            } else {
                true
            }
        });
        delta
    }

    fn encoder_pressed(&mut self) -> bool {
        let now = self.now();
        self.knob.iter().any(|(from, to)| (*from..*to).contains(&now))
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct DisplayLog {
    writes: Vec<(u8, String)>,
    clears: usize,
    released: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(u8, String)> {
        self.log.lock().unwrap().writes.clone()
    }

    pub fn clears(&self) -> usize {
        self.log.lock().unwrap().clears
    }

    pub fn released(&self) -> bool {
        self.log.lock().unwrap().released
    }

    pub fn count(&self, row: u8, text: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(line, written)| *line == row && written.trim_end() == text.trim_end())
            .count()
    }

    pub fn count_containing(&self, row: u8, needle: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(line, written)| *line == row && written.contains(needle))
            .count()
    }
}

impl Display for RecordingDisplay {
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), HardwareError> {
        self.log.lock().unwrap().writes.push((line, text.to_string()));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        self.log.lock().unwrap().clears += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.log.lock().unwrap().released = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingLed {
    levels: Mutex<Vec<f32>>,
    released: AtomicBool,
}

impl RecordingLed {
    pub fn levels(&self) -> Vec<f32> {
        self.levels.lock().unwrap().clone()
    }

    pub fn last_level(&self) -> f32 {
        self.levels.lock().unwrap().last().copied().unwrap_or(0.0)
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Led for RecordingLed {
    fn set_level(&self, level: f32) {
        self.levels.lock().unwrap().push(level);
    }

    fn release(&self) -> Result<(), HardwareError> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct RecordedLeds {
    pub blue: Arc<RecordingLed>,
    pub yellow: Arc<RecordingLed>,
    pub green: Arc<RecordingLed>,
}

pub fn recording_leds() -> (LedBank, RecordedLeds) {
    let recorded = RecordedLeds {
        blue: Arc::new(RecordingLed::default()),
        yellow: Arc::new(RecordingLed::default()),
        green: Arc::new(RecordingLed::default()),
    };
    let bank = LedBank {
        blue: recorded.blue.clone(),
        yellow: recorded.yellow.clone(),
        green: recorded.green.clone(),
    };
    (bank, recorded)
}

#[derive(Debug, Clone, Default)]
pub struct RecordingRelay {
    states: Arc<Mutex<Vec<bool>>>,
    released: Arc<AtomicBool>,
}

impl RecordingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states(&self) -> Vec<bool> {
        self.states.lock().unwrap().clone()
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Relay for RecordingRelay {
    fn set_energized(&mut self, energized: bool) -> Result<(), HardwareError> {
        self.states.lock().unwrap().push(energized);
        Ok(())
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FixedProbe(pub Result<f32, SensorError>);

impl TemperatureProbe for FixedProbe {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.0.clone()
    }
}
