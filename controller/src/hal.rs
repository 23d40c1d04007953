use std::{
    sync::{Arc, OnceLock},
    thread,
    time::{Duration, Instant},
};

use darkroom_common::{Button, SensorError};
use tracing::warn;

use crate::error::HardwareError;

pub trait Display: Send {
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), HardwareError>;
    fn clear(&mut self) -> Result<(), HardwareError>;
    fn release(&mut self) -> Result<(), HardwareError>;
}

pub trait Input: Send {
    fn button_pressed(&mut self, button: Button) -> bool;
    /// Encoder steps since the previous call.
    fn encoder_delta(&mut self) -> i32;
    fn encoder_pressed(&mut self) -> bool;
    fn release(&mut self) -> Result<(), HardwareError>;
}

/// Indicator LED. `level` is 0.0..=1.0; on/off LEDs treat anything above zero
/// as on.
pub trait Led: Send + Sync {
    fn set_level(&self, level: f32);
    fn release(&self) -> Result<(), HardwareError>;

    fn on(&self) {
        self.set_level(1.0);
    }

    fn off(&self) {
        self.set_level(0.0);
    }
}

pub trait Relay: Send {
    fn set_energized(&mut self, energized: bool) -> Result<(), HardwareError>;
    fn release(&mut self) -> Result<(), HardwareError>;
}

pub trait TemperatureProbe: Send {
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
    fn sleep_ms(&self, ms: u64);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        monotonic_ms()
    }

    fn sleep_ms(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

pub fn monotonic_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

#[derive(Clone)]
pub struct LedBank {
    pub blue: Arc<dyn Led>,
    pub yellow: Arc<dyn Led>,
    pub green: Arc<dyn Led>,
}

impl LedBank {
    pub fn all_off(&self) {
        self.blue.off();
        self.yellow.off();
        self.green.off();
    }

    pub fn release(&self) {
        for (name, led) in [
            ("blue", &self.blue),
            ("yellow", &self.yellow),
            ("green", &self.green),
        ] {
            if let Err(err) = led.release() {
                warn!("failed to release {name} led: {err:#}");
            }
        }
    }
}

pub struct Hardware {
    pub display: Box<dyn Display>,
    pub input: Box<dyn Input>,
    pub leds: LedBank,
    pub relay: Box<dyn Relay>,
    pub probe: Box<dyn TemperatureProbe>,
}
