use darkroom_common::{screen, Button, RuntimeConfig, Stage, TemperatureCell};
use tracing::info;

use crate::{
    error::ControlResult, indicators::IndicatorAnimator, panel::Panel,
    settings::choose_develop_settings, stage_timer::StageTimer,
};

pub struct Bench {
    pub panel: Panel,
    pub animator: IndicatorAnimator,
    pub temperature: TemperatureCell,
    pub config: RuntimeConfig,
}

enum Animation {
    Fade,
    Blink,
    None,
}

impl Bench {
    pub fn run_stage(&mut self, stage: Stage) -> ControlResult<()> {
        info!("starting stage {stage}");
        self.animator.status_off();
        let button = stage.button();
        let process = self.config.process.clone();

        match stage {
            Stage::Develop => {
                let choice = choose_develop_settings(
                    &mut self.panel,
                    &self.config.develop,
                    &self.config.timing,
                )?;
                self.step("Pre-Soak", process.short_rinse_s, button, Animation::Fade)?;
                let label = screen::develop_label(&choice.option);
                self.step(&label, choice.adjusted_seconds, button, Animation::Blink)?;
            }
            Stage::StopBath => {
                self.step("Stop bath", process.stop_bath_s, button, Animation::Blink)?;
            }
            Stage::Fix => {
                self.step("Second rinse", process.short_rinse_s, button, Animation::Fade)?;
                self.step("Fixing...", process.fixer_s, button, Animation::Blink)?;
            }
            Stage::Wash => {
                self.step("Final rinse", process.long_rinse_s, button, Animation::Fade)?;
                self.step("Photoflo", process.photoflo_s, button, Animation::None)?;
            }
        }

        self.animator.status_solid();
        info!("stage {stage} finished");
        Ok(())
    }

    fn step(
        &mut self,
        label: &str,
        seconds: u32,
        button: Button,
        animation: Animation,
    ) -> ControlResult<()> {
        let duration_ms = u64::from(seconds) * 1_000;
        match animation {
            Animation::Fade => self.animator.fade_cycle(duration_ms),
            Animation::Blink => self.animator.blink_cycle(duration_ms),
            Animation::None => {}
        }
        StageTimer {
            panel: &mut self.panel,
            animator: &self.animator,
            temperature: &self.temperature,
            timing: &self.config.timing,
        }
        .run(label, seconds, button)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use darkroom_common::{PauseState, ProcessConfig};

    use super::*;
    use crate::{
        error::Shutdown,
        hal::{Clock, SystemClock},
        tasks::TaskRegistry,
        testkit::{recording_leds, ManualClock, RecordedLeds, RecordingDisplay, ScriptedInput},
    };

    type Fixture = (
        Bench,
        RecordingDisplay,
        RecordedLeds,
        TaskRegistry,
        Arc<ManualClock>,
    );

    fn bench(input: impl FnOnce(ScriptedInput) -> ScriptedInput) -> Fixture {
        let clock = ManualClock::new();
        let display = RecordingDisplay::new();
        let shutdown = Shutdown::new();
        let panel = Panel::new(
            Box::new(display.clone()),
            Box::new(input(ScriptedInput::new(clock.clone()))),
            clock.clone(),
            shutdown.clone(),
            20,
        );
        let (bank, leds) = recording_leds();
        let tasks = TaskRegistry::new();
        let animator = IndicatorAnimator::new(
            bank,
            PauseState::new(),
            tasks.clone(),
            Arc::new(SystemClock),
            shutdown,
        );
        let config = RuntimeConfig {
            process: ProcessConfig {
                short_rinse_s: 3,
                long_rinse_s: 4,
                stop_bath_s: 2,
                fixer_s: 5,
                photoflo_s: 1,
            },
            ..RuntimeConfig::default()
        };
        let bench = Bench {
            panel,
            animator,
            temperature: TemperatureCell::new(),
            config,
        };
        (bench, display, leds, tasks, clock)
    }

    #[test]
    fn fix_runs_rinse_then_fixer() {
        let (mut bench, display, leds, tasks, clock) = bench(|input| input);

        bench.run_stage(Stage::Fix).unwrap();

        assert_eq!(display.count(1, "Second rinse"), 3);
        assert_eq!(display.count(1, "Fixing..."), 5);
        assert_eq!(display.count(4, "Hold 3 to pause"), 8);
        assert_eq!(clock.now_ms(), 3_500 + 5_500);
        assert_eq!(leds.green.last_level(), 1.0);
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());
        assert_eq!(leds.blue.last_level(), 0.0);
        assert_eq!(leds.yellow.last_level(), 0.0);
    }

    #[test]
    fn develop_label_carries_the_push_level() {
        let (mut bench, display, _, tasks, _) =
            bench(|input| input.knob(100).turn(400, 1).knob(600));

        bench.run_stage(Stage::Develop).unwrap();

        assert_eq!(display.count(1, "Pre-Soak"), 3);
        assert_eq!(display.count(1, "Developing...     +1"), 72);
        assert_eq!(display.count(4, "Hold 1 to pause"), 75);
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn wash_ends_with_photoflo() {
        let (mut bench, display, _, tasks, clock) = bench(|input| input);

        bench.run_stage(Stage::Wash).unwrap();

        assert_eq!(display.count(1, "Final rinse"), 4);
        assert_eq!(display.count(1, "Photoflo"), 1);
        assert_eq!(clock.now_ms(), 4_500 + 1_500);
        assert!(tasks.join_all(Duration::from_secs(1)).is_empty());
    }
}
