use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[cfg(feature = "rpi")]
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("bus error: {0}")]
    Bus(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("interrupted by operator")]
    Interrupted,
}

pub type ControlResult<T> = Result<T, ControlError>;

#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> ControlResult<()> {
        if self.is_requested() {
            Err(ControlError::Interrupted)
        } else {
            Ok(())
        }
    }
}
