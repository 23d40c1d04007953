pub const FADE_STEP_MS: u64 = 10;
pub const BLINK_WINDOW_MS: u64 = 30_000;
pub const BLINK_ACTIVE_MS: u64 = 10_000;
pub const BLINK_HALF_PERIOD_MS: u64 = 500;
pub const STATUS_BLINK_MS: u64 = 400;

const FADE_STEPS: u16 = 202;

#[derive(Debug, Clone, Default)]
pub struct FadeRamp {
    position: u16,
}

impl FadeRamp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level_percent(&self) -> u8 {
        if self.position <= 100 {
            self.position as u8
        } else {
            (FADE_STEPS - 1 - self.position) as u8
        }
    }

    pub fn level(&self) -> f32 {
        f32::from(self.level_percent()) / 100.0
    }

    pub fn step(&mut self) -> f32 {
        let level = self.level();
        self.position = (self.position + 1) % FADE_STEPS;
        level
    }
}

pub fn blink_cycle_on(elapsed_ms: u64) -> bool {
    let window_pos = elapsed_ms % BLINK_WINDOW_MS;
    window_pos < BLINK_ACTIVE_MS && (window_pos / BLINK_HALF_PERIOD_MS) % 2 == 0
}

pub fn blink_cycle_next_change_ms(elapsed_ms: u64) -> u64 {
    let window_pos = elapsed_ms % BLINK_WINDOW_MS;
    if window_pos < BLINK_ACTIVE_MS {
        BLINK_HALF_PERIOD_MS - window_pos % BLINK_HALF_PERIOD_MS
    } else {
        BLINK_WINDOW_MS - window_pos
    }
}

pub fn status_blink_on(elapsed_ms: u64) -> bool {
    (elapsed_ms / STATUS_BLINK_MS) % 2 == 0
}
