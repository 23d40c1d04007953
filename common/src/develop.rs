use serde::{Deserialize, Serialize};

pub const MIN_DEVELOP_SECONDS: u32 = 10;
pub const MAX_DEVELOP_SECONDS: u32 = 3_600;
pub const DEVELOP_STEP_SECONDS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPullOption {
    pub label: String,
    pub stops: i8,
    pub factor: f64,
}

impl PushPullOption {
    pub fn new(label: &str, stops: i8, factor: f64) -> Self {
        Self {
            label: label.to_string(),
            stops,
            factor,
        }
    }

    pub fn stops_label(&self) -> String {
        if self.stops > 0 {
            format!("+{}", self.stops)
        } else {
            self.stops.to_string()
        }
    }
}

pub fn default_push_pull_options() -> Vec<PushPullOption> {
    vec![
        PushPullOption::new("Pull 2", -2, 0.6),
        PushPullOption::new("Pull 1", -1, 0.8),
        PushPullOption::new("Normal", 0, 1.0),
        PushPullOption::new("Push 1", 1, 1.2),
        PushPullOption::new("Push 2", 2, 1.4),
    ]
}

pub fn clamp_develop_seconds(seconds: i64) -> u32 {
    seconds.clamp(i64::from(MIN_DEVELOP_SECONDS), i64::from(MAX_DEVELOP_SECONDS)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevelopSettings {
    pub base_seconds: u32,
    pub option_index: usize,
}

impl DevelopSettings {
    pub fn adjusted_seconds(&self, options: &[PushPullOption]) -> u32 {
        let factor = options
            .get(self.option_index)
            .map(|option| option.factor)
            .unwrap_or(1.0);
        let scaled = (f64::from(self.base_seconds) * factor).round();
        clamp_develop_seconds(scaled as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialStep {
    BaseTime,
    PushPull,
    Confirmed,
}

#[derive(Debug, Clone)]
pub struct DevelopDial {
    step: DialStep,
    base_seconds: u32,
    option_index: usize,
    option_count: usize,
}

impl DevelopDial {
    pub fn new(base_seconds: u32, option_index: usize, option_count: usize) -> Self {
        let option_count = option_count.max(1);
        Self {
            step: DialStep::BaseTime,
            base_seconds: clamp_develop_seconds(i64::from(base_seconds)),
            option_index: option_index.min(option_count - 1),
            option_count,
        }
    }

    pub fn step(&self) -> DialStep {
        self.step
    }

    pub fn base_seconds(&self) -> u32 {
        self.base_seconds
    }

    pub fn option_index(&self) -> usize {
        self.option_index
    }

    /// Applies encoder steps to the active field. Returns `true` when the value
    /// shown to the operator changed.
    pub fn rotate(&mut self, delta: i32) -> bool {
        if delta == 0 {
            return false;
        }

        match self.step {
            DialStep::BaseTime => {
                let proposed = i64::from(self.base_seconds)
                    + i64::from(delta) * i64::from(DEVELOP_STEP_SECONDS);
                let next = clamp_develop_seconds(proposed);
                let changed = next != self.base_seconds;
                self.base_seconds = next;
                changed
            }
            DialStep::PushPull => {
                let count = self.option_count as i64;
                let next = (self.option_index as i64 + i64::from(delta)).rem_euclid(count) as usize;
                let changed = next != self.option_index;
                self.option_index = next;
                changed
            }
            DialStep::Confirmed => false,
        }
    }

    pub fn confirm(&mut self) -> DialStep {
        self.step = match self.step {
            DialStep::BaseTime => DialStep::PushPull,
            DialStep::PushPull | DialStep::Confirmed => DialStep::Confirmed,
        };
        self.step
    }

    pub fn settings(&self) -> DevelopSettings {
        DevelopSettings {
            base_seconds: self.base_seconds,
            option_index: self.option_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_index() -> usize {
        default_push_pull_options()
            .iter()
            .position(|option| option.label == "Normal")
            .unwrap()
    }

    #[test]
    fn push_one_stop_scales_sixty_seconds_to_seventy_two() {
        let options = default_push_pull_options();
        let settings = DevelopSettings {
            base_seconds: 60,
            option_index: 3,
        };
        assert_eq!(options[3].factor, 1.2);
        assert_eq!(settings.adjusted_seconds(&options), 72);
    }

    #[test]
    fn base_time_never_leaves_bounds() {
        let mut dial = DevelopDial::new(10, normal_index(), 5);
        assert!(!dial.rotate(-1));
        assert!(!dial.rotate(-40));
        assert_eq!(dial.base_seconds(), 10);

        assert!(dial.rotate(i32::MAX / 2));
        assert_eq!(dial.base_seconds(), MAX_DEVELOP_SECONDS);
    }

    #[test]
    fn adjusted_time_is_clamped_for_extreme_presets() {
        let options = default_push_pull_options();
        let pulled = DevelopSettings {
            base_seconds: 10,
            option_index: 0,
        };
        let pushed = DevelopSettings {
            base_seconds: 3_600,
            option_index: 4,
        };
        assert_eq!(pulled.adjusted_seconds(&options), MIN_DEVELOP_SECONDS);
        assert_eq!(pushed.adjusted_seconds(&options), MAX_DEVELOP_SECONDS);
    }

    #[test]
    fn preset_index_wraps_in_both_directions() {
        let mut dial = DevelopDial::new(60, 0, 5);
        dial.confirm();
        assert_eq!(dial.step(), DialStep::PushPull);

        dial.rotate(-1);
        assert_eq!(dial.option_index(), 4);
        dial.rotate(2);
        assert_eq!(dial.option_index(), 1);
        dial.rotate(-11);
        assert_eq!(dial.option_index(), 0);
    }

    #[test]
    fn rotation_only_touches_the_active_field() {
        let mut dial = DevelopDial::new(60, normal_index(), 5);
        dial.rotate(2);
        assert_eq!(dial.base_seconds(), 70);
        assert_eq!(dial.option_index(), normal_index());

        dial.confirm();
        dial.rotate(1);
        assert_eq!(dial.base_seconds(), 70);
        assert_eq!(dial.option_index(), normal_index() + 1);

        assert_eq!(dial.confirm(), DialStep::Confirmed);
        assert!(!dial.rotate(3));
        assert_eq!(
            dial.settings(),
            DevelopSettings {
                base_seconds: 70,
                option_index: normal_index() + 1,
            }
        );
    }

    #[test]
    fn stops_label_is_signed() {
        let options = default_push_pull_options();
        let labels: Vec<String> = options.iter().map(PushPullOption::stops_label).collect();
        assert_eq!(labels, vec!["-2", "-1", "0", "+1", "+2"]);
    }
}
