use serde::{Deserialize, Serialize};

use crate::develop::{
    clamp_develop_seconds, default_push_pull_options, DevelopSettings, PushPullOption,
};
use crate::timer::LONG_PRESS_MS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessConfig {
    pub short_rinse_s: u32,
    pub long_rinse_s: u32,
    pub stop_bath_s: u32,
    pub fixer_s: u32,
    pub photoflo_s: u32,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            short_rinse_s: 60,
            long_rinse_s: 5 * 60,
            stop_bath_s: 60,
            fixer_s: 330,
            photoflo_s: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DevelopConfig {
    pub base_seconds: u32,
    pub default_option: String,
    pub push_pull: Vec<PushPullOption>,
}

impl Default for DevelopConfig {
    fn default() -> Self {
        Self {
            base_seconds: 60,
            default_option: "Normal".to_string(),
            push_pull: default_push_pull_options(),
        }
    }
}

impl DevelopConfig {
    pub fn default_index(&self) -> usize {
        self.push_pull
            .iter()
            .position(|option| option.label == self.default_option)
            .unwrap_or(self.push_pull.len() / 2)
    }

    pub fn default_settings(&self) -> DevelopSettings {
        DevelopSettings {
            base_seconds: self.base_seconds,
            option_index: self.default_index(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub long_press_ms: u64,
    pub settle_ms: u64,
    pub invalid_notice_ms: u64,
    pub knob_debounce_ms: u64,
    pub settings_summary_ms: u64,
    pub min_poll_ms: u64,
    pub max_poll_ms: u64,
    pub pause_poll_ms: u64,
    pub input_poll_ms: u64,
    pub teardown_join_ms: u64,
    pub sampler_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            long_press_ms: LONG_PRESS_MS,
            settle_ms: 500,
            invalid_notice_ms: 1_000,
            knob_debounce_ms: 150,
            settings_summary_ms: 1_200,
            min_poll_ms: 20,
            max_poll_ms: 100,
            pause_poll_ms: 50,
            input_poll_ms: 20,
            teardown_join_ms: 1_500,
            sampler_interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeaterConfig {
    pub enabled: bool,
    pub heat_on_below_c: f32,
    pub heat_off_above_c: f32,
    pub interval_ms: u64,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            heat_on_below_c: 20.0,
            heat_off_above_c: 21.0,
            interval_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PinConfig {
    pub buttons: [u8; 4],
    pub blue_led: u8,
    pub yellow_led: u8,
    pub green_led: u8,
    pub heater_relay: u8,
    pub encoder_a: u8,
    pub encoder_b: u8,
    pub encoder_button: u8,
    pub lcd_i2c_address: u16,
    pub w1_devices_dir: String,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            buttons: [25, 8, 23, 24],
            blue_led: 17,
            yellow_led: 27,
            green_led: 22,
            heater_relay: 16,
            encoder_a: 5,
            encoder_b: 6,
            encoder_button: 12,
            lcd_i2c_address: 0x27,
            w1_devices_dir: "/sys/bus/w1/devices".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub process: ProcessConfig,
    pub develop: DevelopConfig,
    pub timing: TimingConfig,
    pub heater: HeaterConfig,
    pub pins: PinConfig,
}

impl RuntimeConfig {
    pub fn from_json(raw: &[u8]) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_slice(raw)?;
        config.sanitize();
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        let process = &mut self.process;
        for seconds in [
            &mut process.short_rinse_s,
            &mut process.long_rinse_s,
            &mut process.stop_bath_s,
            &mut process.fixer_s,
            &mut process.photoflo_s,
        ] {
            *seconds = (*seconds).max(1);
        }

        self.develop.base_seconds = clamp_develop_seconds(i64::from(self.develop.base_seconds));
        self.develop
            .push_pull
            .retain(|option| option.factor.is_finite() && option.factor > 0.0);
        if self.develop.push_pull.is_empty() {
            self.develop.push_pull = default_push_pull_options();
        }

        let timing = &mut self.timing;
        timing.long_press_ms = timing.long_press_ms.clamp(200, 5_000);
        timing.min_poll_ms = timing.min_poll_ms.clamp(1, 100);
        timing.max_poll_ms = timing.max_poll_ms.clamp(timing.min_poll_ms, 100);
        timing.pause_poll_ms = timing.pause_poll_ms.clamp(10, 100);
        timing.input_poll_ms = timing.input_poll_ms.clamp(5, 100);
        timing.sampler_interval_ms = timing.sampler_interval_ms.clamp(100, 60_000);

        let heater = &mut self.heater;
        if !(heater.heat_on_below_c.is_finite()
            && heater.heat_off_above_c.is_finite()
            && heater.heat_on_below_c < heater.heat_off_above_c)
        {
            let defaults = HeaterConfig::default();
            heater.heat_on_below_c = defaults.heat_on_below_c;
            heater.heat_off_above_c = defaults.heat_off_above_c;
        }
        heater.interval_ms = heater.interval_ms.clamp(100, 60_000);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let raw = br#"{ "process": { "fixer_s": 300 }, "heater": { "enabled": false } }"#;
        let config = RuntimeConfig::from_json(raw).unwrap();

        assert_eq!(config.process.fixer_s, 300);
        assert_eq!(config.process.short_rinse_s, 60);
        assert!(!config.heater.enabled);
        assert_eq!(config.heater.heat_on_below_c, 20.0);
        assert_eq!(config.timing, TimingConfig::default());
    }

    #[test]
    fn sanitize_repairs_out_of_range_values() {
        let mut config = RuntimeConfig::default();
        config.develop.base_seconds = 5;
        config.develop.push_pull.clear();
        config.timing.max_poll_ms = 5_000;
        config.heater.heat_on_below_c = 25.0;
        config.process.photoflo_s = 0;

        config.sanitize();

        assert_eq!(config.develop.base_seconds, 10);
        assert_eq!(config.develop.push_pull, default_push_pull_options());
        assert_eq!(config.timing.max_poll_ms, 100);
        assert_eq!(config.heater, HeaterConfig::default());
        assert_eq!(config.process.photoflo_s, 1);
    }

    #[test]
    fn default_preset_is_normal() {
        let develop = DevelopConfig::default();
        assert_eq!(develop.default_index(), 2);
        assert_eq!(develop.default_settings().adjusted_seconds(&develop.push_pull), 60);
    }

    #[test]
    fn unknown_default_preset_falls_back_to_middle() {
        let develop = DevelopConfig {
            default_option: "Push 9".to_string(),
            ..DevelopConfig::default()
        };
        assert_eq!(develop.default_index(), 2);
    }
}
