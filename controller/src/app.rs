use std::{sync::Arc, time::Duration};

use anyhow::Context;
use darkroom_common::{screen, PauseState, Progress, RuntimeConfig, StageSequencer, TemperatureCell};
use tracing::{debug, info, warn};

use crate::{
    error::{ControlError, ControlResult, Shutdown},
    hal::{Clock, Hardware, LedBank, SystemClock},
    heater::{self, SharedRelay},
    indicators::IndicatorAnimator,
    panel::Panel,
    sampler::spawn_sampler,
    stages::Bench,
    tasks::TaskRegistry,
};

pub struct Controller {
    bench: Bench,
    sequencer: StageSequencer,
    leds: LedBank,
    relay: SharedRelay,
    tasks: TaskRegistry,
    shutdown: Shutdown,
    teardown_join: Duration,
    torn_down: bool,
}

impl Controller {
    pub fn start(
        hardware: Hardware,
        config: RuntimeConfig,
        clock: Arc<dyn Clock>,
        shutdown: Shutdown,
    ) -> anyhow::Result<Self> {
        let Hardware {
            display,
            input,
            leds,
            relay,
            probe,
        } = hardware;

        let background: Arc<dyn Clock> = Arc::new(SystemClock);
        let tasks = TaskRegistry::new();
        let temperature = TemperatureCell::new();
        let relay = heater::shared_relay(relay);
        let animator = IndicatorAnimator::new(
            leds.clone(),
            PauseState::new(),
            tasks.clone(),
            background.clone(),
            shutdown.clone(),
        );
        let panel = Panel::new(
            display,
            input,
            clock,
            shutdown.clone(),
            config.timing.input_poll_ms,
        );

        let controller = Self {
            bench: Bench {
                panel,
                animator,
                temperature: temperature.clone(),
                config: config.clone(),
            },
            sequencer: StageSequencer::new(),
            leds,
            relay: relay.clone(),
            tasks: tasks.clone(),
            shutdown: shutdown.clone(),
            teardown_join: Duration::from_millis(config.timing.teardown_join_ms),
            torn_down: false,
        };

        controller.leds.all_off();
        heater::force_off(&relay);

        spawn_sampler(
            &tasks,
            probe,
            temperature.clone(),
            background.clone(),
            shutdown.clone(),
            config.timing.sampler_interval_ms,
        )
        .context("failed to start temperature sampler")?;
        spawn_heater(&tasks, relay, temperature, &config, background, shutdown)?;

        info!("controller started");
        Ok(controller)
    }

    #[cfg(test)]
    pub fn sequencer(&self) -> &StageSequencer {
        &self.sequencer
    }

    pub fn run(&mut self) -> ControlResult<()> {
        loop {
            self.offer_next_stage()?;
        }
    }

    fn offer_next_stage(&mut self) -> ControlResult<()> {
        let menu = match self.sequencer.last_completed() {
            None => screen::welcome(),
            Some(_) => screen::stage_finished(),
        };
        let panel = &mut self.bench.panel;
        panel.clear();
        panel.show(&menu);

        let button = panel.wait_for_button()?;
        let stage = match self.sequencer.select(button) {
            Ok(stage) => stage,
            Err(err) => {
                info!("rejected button {button}: {err}");
                panel.clear();
                panel.show(&screen::invalid_stage());
                return panel.hold(self.bench.config.timing.invalid_notice_ms);
            }
        };

        self.bench.run_stage(stage)?;
        match self.sequencer.complete(stage) {
            Ok(Progress::StageDone { next }) => info!("next stage: {next}"),
            Ok(Progress::RunComplete) => {
                info!("run complete");
                let panel = &mut self.bench.panel;
                panel.clear();
                panel.show(&screen::run_complete());
                panel.wait_for_button()?;
            }
            Err(err) => warn!("stage bookkeeping out of step: {err}"),
        }
        Ok(())
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        info!("shutting down controller");

        self.shutdown.request();
        debug!("stopping background threads: {}", self.tasks.running().join(", "));
        self.bench.animator.all_off();
        let abandoned = self.tasks.join_all(self.teardown_join);
        if !abandoned.is_empty() {
            warn!("abandoned background threads: {}", abandoned.join(", "));
        }

        self.leds.all_off();
        heater::force_off(&self.relay);

        self.bench.panel.release();
        self.leds.release();
        heater::release(&self.relay);
        info!("controller shut down");
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn spawn_heater(
    tasks: &TaskRegistry,
    relay: SharedRelay,
    temperature: TemperatureCell,
    config: &RuntimeConfig,
    clock: Arc<dyn Clock>,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    if !config.heater.enabled {
        info!("heater control disabled");
        return Ok(());
    }
    heater::spawn_heater_loop(
        tasks,
        relay,
        temperature,
        config.heater.clone(),
        clock,
        shutdown,
    )
    .context("failed to start heater loop")
}

pub async fn run(
    hardware: Hardware,
    config: RuntimeConfig,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let foreground = {
        let shutdown = shutdown.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let mut controller =
                Controller::start(hardware, config, Arc::new(SystemClock), shutdown)?;
            match controller.run() {
                Ok(()) | Err(ControlError::Interrupted) => Ok(()),
            }
        })
    };
    tokio::pin!(foreground);

    tokio::select! {
        result = &mut foreground => {
            return result.context("controller thread panicked")?;
        }
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("interrupt received"),
                Err(err) => warn!("failed to listen for ctrl-c, shutting down: {err:#}"),
            }
            shutdown.request();
        }
    }

    foreground.await.context("controller thread panicked")?
}
