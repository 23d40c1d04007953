pub const LONG_PRESS_MS: u64 = 1_200;

/// Fires exactly once per continuous hold that reaches the threshold. A
/// release re-arms it.
#[derive(Debug, Clone, Copy)]
pub struct LongPress {
    threshold_ms: u64,
    press_start_ms: Option<u64>,
    fired: bool,
}

impl LongPress {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            press_start_ms: None,
            fired: false,
        }
    }

    pub fn update(&mut self, pressed: bool, now_ms: u64) -> bool {
        if !pressed {
            self.press_start_ms = None;
            self.fired = false;
            return false;
        }

        let start = *self.press_start_ms.get_or_insert(now_ms);
        if !self.fired && now_ms.saturating_sub(start) >= self.threshold_ms {
            self.fired = true;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Running,
    Paused { since_ms: u64 },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Render { seconds: u64 },
    Paused,
    Resumed { paused_ms: u64 },
    Idle,
    Finished,
}

#[derive(Debug, Clone)]
pub struct TimerSession {
    deadline_ms: u64,
    phase: TimerPhase,
    press: LongPress,
    last_displayed: Option<u64>,
    paused_total_ms: u64,
}

impl TimerSession {
    pub fn start(duration_ms: u64, now_ms: u64, long_press_ms: u64) -> Self {
        Self {
            deadline_ms: now_ms.saturating_add(duration_ms),
            phase: TimerPhase::Running,
            press: LongPress::new(long_press_ms),
            last_displayed: None,
            paused_total_ms: 0,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    pub fn paused_total_ms(&self) -> u64 {
        self.paused_total_ms
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.phase {
            TimerPhase::Running => self.deadline_ms.saturating_sub(now_ms),
            TimerPhase::Paused { since_ms } => self.deadline_ms.saturating_sub(since_ms),
            TimerPhase::Finished => 0,
        }
    }

    pub fn display_seconds(&self, now_ms: u64) -> u64 {
        self.remaining_ms(now_ms).div_ceil(1_000)
    }

    pub fn poll(&mut self, pause_pressed: bool, now_ms: u64) -> TimerEvent {
        match self.phase {
            TimerPhase::Finished => TimerEvent::Finished,
            TimerPhase::Running => {
                if now_ms >= self.deadline_ms {
                    self.phase = TimerPhase::Finished;
                    return TimerEvent::Finished;
                }

                if self.press.update(pause_pressed, now_ms) {
                    self.phase = TimerPhase::Paused { since_ms: now_ms };
                    return TimerEvent::Paused;
                }

                let seconds = self.display_seconds(now_ms);
                if self.last_displayed == Some(seconds) {
                    TimerEvent::Idle
                } else {
                    self.last_displayed = Some(seconds);
                    TimerEvent::Render { seconds }
                }
            }
            TimerPhase::Paused { since_ms } => {
                if !self.press.update(pause_pressed, now_ms) {
                    return TimerEvent::Idle;
                }

                let paused_ms = now_ms.saturating_sub(since_ms);
                self.deadline_ms = self.deadline_ms.saturating_add(paused_ms);
                self.paused_total_ms = self.paused_total_ms.saturating_add(paused_ms);
                self.phase = TimerPhase::Running;
                // The paused screen replaced the countdown; force a redraw.
                self.last_displayed = None;
                TimerEvent::Resumed { paused_ms }
            }
        }
    }

    /// How long to sleep before the next poll: just past the next whole-second
    /// boundary, bounded to `[min_ms, max_ms]` and never past the deadline.
    pub fn next_poll_delay_ms(
        &self,
        now_ms: u64,
        min_ms: u64,
        max_ms: u64,
        paused_ms: u64,
    ) -> u64 {
        match self.phase {
            TimerPhase::Finished => 0,
            TimerPhase::Paused { .. } => paused_ms,
            TimerPhase::Running => {
                let remaining = self.remaining_ms(now_ms);
                if remaining == 0 {
                    return 0;
                }
                let seconds = remaining.div_ceil(1_000);
                let until_tick = remaining.saturating_sub((seconds - 1) * 1_000);
                until_tick.clamp(min_ms, max_ms).min(remaining)
            }
        }
    }
}
