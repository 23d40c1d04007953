use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use darkroom_common::{
    indicator::{
        blink_cycle_next_change_ms, blink_cycle_on, status_blink_on, FadeRamp, FADE_STEP_MS,
        STATUS_BLINK_MS,
    },
    PauseState,
};
use tracing::{debug, warn};

use crate::{
    error::Shutdown,
    hal::{Clock, LedBank},
    tasks::TaskRegistry,
};

pub const ANIMATION_POLL_MS: u64 = 100;

pub struct IndicatorAnimator {
    leds: LedBank,
    signals: Arc<PauseState>,
    tasks: TaskRegistry,
    clock: Arc<dyn Clock>,
    shutdown: Shutdown,
    status_lock: Arc<Mutex<()>>,
    blinker_active: Arc<AtomicBool>,
}

impl IndicatorAnimator {
    pub fn new(
        leds: LedBank,
        signals: Arc<PauseState>,
        tasks: TaskRegistry,
        clock: Arc<dyn Clock>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            leds,
            signals,
            tasks,
            clock,
            shutdown,
            status_lock: Arc::new(Mutex::new(())),
            blinker_active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fade_cycle(&self, duration_ms: u64) {
        let token = self.signals.begin_cycle();
        let led = self.leds.blue.clone();
        let signals = self.signals.clone();
        let clock = self.clock.clone();
        let shutdown = self.shutdown.clone();

        let spawned = self.tasks.spawn("fade-cycle", move || {
            let mut ramp = FadeRamp::new();
            let mut elapsed = 0;
            let mut last = clock.now_ms();
            let mut was_paused = false;

            while elapsed < duration_ms {
                if signals.cycle_ended(token) || shutdown.is_requested() {
                    break;
                }
                let now = clock.now_ms();
                if !was_paused {
                    elapsed += now.saturating_sub(last);
                }
                last = now;

                was_paused = signals.snapshot().pause;
                if was_paused {
                    led.off();
                    clock.sleep_ms(FADE_STEP_MS);
                    continue;
                }
                led.set_level(ramp.step());
                clock.sleep_ms(FADE_STEP_MS);
            }
            led.off();
            debug!("fade cycle ended after {elapsed} ms");
        });
        if let Err(err) = spawned {
            warn!("failed to start fade cycle: {err:#}");
        }
    }

    pub fn blink_cycle(&self, duration_ms: u64) {
        let token = self.signals.begin_cycle();
        let led = self.leds.yellow.clone();
        let signals = self.signals.clone();
        let clock = self.clock.clone();
        let shutdown = self.shutdown.clone();

        let spawned = self.tasks.spawn("blink-cycle", move || {
            let mut elapsed = 0;
            let mut last = clock.now_ms();
            let mut was_paused = false;
            let mut lit = None;

            loop {
                if signals.cycle_ended(token) || shutdown.is_requested() {
                    break;
                }
                let now = clock.now_ms();
                if !was_paused {
                    elapsed += now.saturating_sub(last);
                }
                last = now;
                if elapsed >= duration_ms {
                    break;
                }

                was_paused = signals.snapshot().pause;
                if was_paused {
                    if lit != Some(false) {
                        led.off();
                        lit = Some(false);
                    }
                    clock.sleep_ms(ANIMATION_POLL_MS / 2);
                    continue;
                }

                let on = blink_cycle_on(elapsed);
                if lit != Some(on) {
                    led.set_level(if on { 1.0 } else { 0.0 });
                    lit = Some(on);
                }
                let wait = blink_cycle_next_change_ms(elapsed)
                    .min(duration_ms - elapsed)
                    .min(ANIMATION_POLL_MS)
                    .max(1);
                clock.sleep_ms(wait);
            }
            led.off();
            debug!("blink cycle ended after {elapsed} ms");
        });
        if let Err(err) = spawned {
            warn!("failed to start blink cycle: {err:#}");
        }
    }

    pub fn status_solid(&self) {
        let _guard = self.lock_status();
        self.signals.set_green_blink(false);
        self.leds.green.on();
    }

    pub fn status_off(&self) {
        let _guard = self.lock_status();
        self.signals.set_green_blink(false);
        self.leds.green.off();
    }

    /// Green "waiting on operator" blink. Ignores `pause`; runs until
    /// `status_solid`, `status_off` or `all_off`.
    pub fn start_status_blink(&self) {
        let _guard = self.lock_status();
        self.signals.set_green_blink(true);
        if self.blinker_active.swap(true, Ordering::SeqCst) {
            return;
        }

        let led = self.leds.green.clone();
        let signals = self.signals.clone();
        let clock = self.clock.clone();
        let shutdown = self.shutdown.clone();
        let status_lock = self.status_lock.clone();
        let active = self.blinker_active.clone();
        let started = clock.now_ms();

        let spawned = self.tasks.spawn("status-blink", move || loop {
            let elapsed = clock.now_ms().saturating_sub(started);
            {
                let _guard = status_lock.lock().unwrap_or_else(PoisonError::into_inner);
                if !signals.snapshot().green_blink || shutdown.is_requested() {
                    active.store(false, Ordering::SeqCst);
                    break;
                }
                led.set_level(if status_blink_on(elapsed) { 1.0 } else { 0.0 });
            }
            let wait = (STATUS_BLINK_MS - elapsed % STATUS_BLINK_MS).min(ANIMATION_POLL_MS);
            clock.sleep_ms(wait);
        });
        if let Err(err) = spawned {
            self.blinker_active.store(false, Ordering::SeqCst);
            warn!("failed to start status blink: {err:#}");
        }
    }

    pub fn stop_status_blink(&self) {
        self.status_off();
    }

    pub fn pause(&self) {
        self.signals.request_pause();
    }

    pub fn resume(&self) {
        self.signals.release_pause();
    }

    pub fn all_off(&self) {
        let _guard = self.lock_status();
        self.signals.clear();
        self.leds.all_off();
    }

    fn lock_status(&self) -> std::sync::MutexGuard<'_, ()> {
        self.status_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
