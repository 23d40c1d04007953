use std::{
    io::BufRead,
    path::Path,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread,
};

use darkroom_common::{screen, Button, RuntimeConfig, SensorError};
use tracing::{debug, info, warn};

use crate::{
    error::{HardwareError, Shutdown},
    hal::{monotonic_ms, Display, Hardware, Input, Led, LedBank, Relay, TemperatureProbe},
    sampler::W1Probe,
};

const TAP_MS: u64 = 150;
const HOLD_MS: u64 = 1_300;

pub fn open(config: &RuntimeConfig, shutdown: &Shutdown) -> anyhow::Result<Hardware> {
    let input = ConsoleInput::new();
    input.spawn_reader()?;
    print_help();

    let w1_dir = Path::new(&config.pins.w1_devices_dir);
    let probe: Box<dyn TemperatureProbe> = if W1Probe::is_present(w1_dir) {
        info!("reading temperature from {}", w1_dir.display());
        Box::new(W1Probe::new(w1_dir, shutdown.clone()))
    } else {
        info!("no 1-wire probe found, simulating bath temperature");
        Box::new(SimulatedProbe::new())
    };

    Ok(Hardware {
        display: Box::new(ConsoleDisplay::default()),
        input: Box::new(input),
        leds: LedBank {
            blue: Arc::new(LogLed::new("blue")),
            yellow: Arc::new(LogLed::new("yellow")),
            green: Arc::new(LogLed::new("green")),
        },
        relay: Box::new(LogRelay::default()),
        probe,
    })
}

fn print_help() {
    info!("console input: 1-4 tap a button, h1-h4 hold it, +N/-N turn the knob, k press it");
}

#[derive(Debug)]
struct ConsoleDisplay {
    rows: [String; screen::LCD_ROWS],
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self {
            rows: std::array::from_fn(|_| screen::fit_line("")),
        }
    }
}

impl Display for ConsoleDisplay {
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), HardwareError> {
        let index = usize::from(line)
            .checked_sub(1)
            .filter(|index| *index < screen::LCD_ROWS)
            .ok_or_else(|| HardwareError::Bus(format!("no display line {line}")))?;
        self.rows[index] = screen::fit_line(text);
        if index == screen::LCD_ROWS - 1 {
            let border = "-".repeat(screen::LCD_COLUMNS);
            let body: Vec<String> = self.rows.iter().map(|row| format!("|{row}|")).collect();
            info!("display\n+{border}+\n{}\n+{border}+", body.join("\n"));
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), HardwareError> {
        for row in &mut self.rows {
            *row = screen::fit_line("");
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        debug!("console display released");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimCommand {
    Press { button: Button, hold_ms: u64 },
    Turn(i32),
    Knob,
}

fn parse_command(line: &str) -> Option<SimCommand> {
    let line = line.trim();
    let button = |digits: &str| digits.parse::<u8>().ok().and_then(Button::from_number);

    if line == "k" {
        return Some(SimCommand::Knob);
    }
    if let Some(rest) = line.strip_prefix('h') {
        return button(rest).map(|button| SimCommand::Press {
            button,
            hold_ms: HOLD_MS,
        });
    }
    if line.starts_with('+') || line.starts_with('-') {
        let steps = line.parse::<i32>().ok().filter(|steps| *steps != 0)?;
        return Some(SimCommand::Turn(steps));
    }
    button(line).map(|button| SimCommand::Press {
        button,
        hold_ms: TAP_MS,
    })
}

#[derive(Debug, Default)]
struct SimInputState {
    buttons_until: [u64; 4],
    knob_until: u64,
    pending_steps: i32,
}

impl SimInputState {
    fn apply(&mut self, command: SimCommand, now_ms: u64) {
        match command {
            SimCommand::Press { button, hold_ms } => {
                self.buttons_until[button.index()] = now_ms + hold_ms;
            }
            SimCommand::Turn(steps) => self.pending_steps += steps,
            SimCommand::Knob => self.knob_until = now_ms + TAP_MS,
        }
    }
}

#[derive(Clone, Default)]
struct ConsoleInput {
    state: Arc<Mutex<SimInputState>>,
}

impl ConsoleInput {
    fn new() -> Self {
        Self::default()
    }

    // Blocking stdin reads cannot observe shutdown, so the reader thread is
    // detached rather than registered for teardown.
    fn spawn_reader(&self) -> std::io::Result<()> {
        let state = self.state.clone();
        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    let line = match line {
                        Ok(line) => line,
                        Err(err) => {
                            warn!("stdin read failed: {err:#}");
                            break;
                        }
                    };
                    match parse_command(&line) {
                        Some(command) => {
                            debug!("console input: {command:?}");
                            state
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .apply(command, monotonic_ms());
                        }
                        None if line.trim().is_empty() => {}
                        None => warn!("unknown console command {line:?}"),
                    }
                }
            })?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimInputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Input for ConsoleInput {
    fn button_pressed(&mut self, button: Button) -> bool {
        monotonic_ms() < self.lock().buttons_until[button.index()]
    }

    fn encoder_delta(&mut self) -> i32 {
        std::mem::take(&mut self.lock().pending_steps)
    }

    fn encoder_pressed(&mut self) -> bool {
        monotonic_ms() < self.lock().knob_until
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        *self.lock() = SimInputState::default();
        Ok(())
    }
}

struct LogLed {
    name: &'static str,
    level_bits: AtomicU32,
}

impl LogLed {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            level_bits: AtomicU32::new(0.0f32.to_bits()),
        }
    }
}

impl Led for LogLed {
    fn set_level(&self, level: f32) {
        let level = level.clamp(0.0, 1.0);
        let previous = f32::from_bits(self.level_bits.swap(level.to_bits(), Ordering::Relaxed));
        if (previous > 0.0) != (level > 0.0) {
            debug!("{} led {}", self.name, if level > 0.0 { "on" } else { "off" });
        }
    }

    fn release(&self) -> Result<(), HardwareError> {
        self.set_level(0.0);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LogRelay {
    energized: bool,
}

impl Relay for LogRelay {
    fn set_energized(&mut self, energized: bool) -> Result<(), HardwareError> {
        if energized != self.energized {
            info!("heater relay {}", if energized { "on" } else { "off" });
        }
        self.energized = energized;
        Ok(())
    }

    fn release(&mut self) -> Result<(), HardwareError> {
        self.set_energized(false)
    }
}

struct SimulatedProbe {
    started_ms: u64,
}

impl SimulatedProbe {
    fn new() -> Self {
        Self {
            started_ms: monotonic_ms(),
        }
    }

    fn reading_at(elapsed_ms: u64) -> f32 {
        let phase = (elapsed_ms % 240_000) as f32 / 240_000.0 * std::f32::consts::TAU;
        20.5 - 1.2 * phase.cos()
    }
}

impl TemperatureProbe for SimulatedProbe {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        Ok(Self::reading_at(monotonic_ms().saturating_sub(self.started_ms)))
    }
}
