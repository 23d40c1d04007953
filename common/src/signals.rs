use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalSnapshot {
    pub stop: bool,
    pub pause: bool,
    pub green_blink: bool,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleToken {
    epoch: u64,
}

#[derive(Debug, Default)]
pub struct PauseState {
    stop: AtomicBool,
    pause: AtomicBool,
    green_blink: AtomicBool,
    epoch: AtomicU64,
}

impl PauseState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Clears `stop` and supersedes any cycle still running. Call before
    /// spawning a new duration-bound animation.
    pub fn begin_cycle(&self) -> CycleToken {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.stop.store(false, Ordering::SeqCst);
        CycleToken { epoch }
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn request_pause(&self) {
        self.pause.store(true, Ordering::SeqCst);
    }

    pub fn release_pause(&self) {
        self.pause.store(false, Ordering::SeqCst);
    }

    pub fn set_green_blink(&self, enabled: bool) {
        self.green_blink.store(enabled, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.request_stop();
        self.pause.store(false, Ordering::SeqCst);
        self.green_blink.store(false, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            stop: self.stop.load(Ordering::SeqCst),
            pause: self.pause.load(Ordering::SeqCst),
            green_blink: self.green_blink.load(Ordering::SeqCst),
            epoch: self.epoch.load(Ordering::SeqCst),
        }
    }

    pub fn cycle_ended(&self, token: CycleToken) -> bool {
        let snapshot = self.snapshot();
        snapshot.stop || snapshot.epoch != token.epoch
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemperatureCell {
    reading: Arc<Mutex<Option<f32>>>,
}

impl TemperatureCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_reading(&self) -> Option<f32> {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, reading: Option<f32>) {
        *self.reading.lock().unwrap_or_else(PoisonError::into_inner) = reading;
    }
}
