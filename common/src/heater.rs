use crate::config::HeaterConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterAction {
    Energize,
    DeEnergize,
}

#[derive(Debug, Clone)]
pub struct HeaterEngine {
    config: HeaterConfig,
    energized: bool,
}

impl HeaterEngine {
    pub fn new(config: HeaterConfig) -> Self {
        Self {
            config,
            energized: false,
        }
    }

    pub fn update(&mut self, reading_c: Option<f32>) -> Option<HeaterAction> {
        let desired = match reading_c {
            None => false,
            Some(_) if !self.config.enabled => false,
            Some(temp) if temp < self.config.heat_on_below_c => true,
            Some(temp) if temp > self.config.heat_off_above_c => false,
            Some(_) => self.energized,
        };

        if desired == self.energized {
            return None;
        }
        self.energized = desired;
        Some(if desired {
            HeaterAction::Energize
        } else {
            HeaterAction::DeEnergize
        })
    }

    pub fn force_off(&mut self) -> Option<HeaterAction> {
        if self.energized {
            self.energized = false;
            Some(HeaterAction::DeEnergize)
        } else {
            None
        }
    }
}
