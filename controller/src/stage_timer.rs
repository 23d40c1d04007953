use darkroom_common::{screen, Button, TemperatureCell, TimerEvent, TimerSession, TimingConfig};
use tracing::info;

use crate::{error::ControlResult, indicators::IndicatorAnimator, panel::Panel};

pub struct StageTimer<'a> {
    pub panel: &'a mut Panel,
    pub animator: &'a IndicatorAnimator,
    pub temperature: &'a TemperatureCell,
    pub timing: &'a TimingConfig,
}

impl StageTimer<'_> {
    pub fn run(
        &mut self,
        label: &str,
        duration_s: u32,
        pause_button: Button,
    ) -> ControlResult<()> {
        let result = self.countdown(label, duration_s, pause_button);
        self.animator.all_off();
        self.panel.clear();
        result?;
        self.panel.hold(self.timing.settle_ms)
    }

    fn countdown(
        &mut self,
        label: &str,
        duration_s: u32,
        pause_button: Button,
    ) -> ControlResult<()> {
        let started = self.panel.now_ms();
        let mut session = TimerSession::start(
            u64::from(duration_s.max(1)) * 1_000,
            started,
            self.timing.long_press_ms,
        );
        info!("{}: {duration_s} s countdown started", label.trim_end());

        loop {
            self.panel.check()?;
            let now = self.panel.now_ms();
            let pressed = self.panel.button_pressed(pause_button);

            match session.poll(pressed, now) {
                TimerEvent::Render { seconds } => {
                    let frame = screen::countdown(
                        label,
                        self.temperature.current_reading(),
                        seconds,
                        pause_button,
                    );
                    self.panel.show(&frame);
                }
                TimerEvent::Paused => {
                    self.animator.pause();
                    self.animator.start_status_blink();
                    self.panel.clear();
                    self.panel.show(&screen::paused());
                    info!(
                        "{}: paused with {} ms left",
                        label.trim_end(),
                        session.remaining_ms(now)
                    );
                }
                TimerEvent::Resumed { paused_ms } => {
                    self.animator.stop_status_blink();
                    self.animator.resume();
                    self.panel.clear();
                    info!("{}: resumed after {paused_ms} ms", label.trim_end());
                }
                TimerEvent::Idle => {}
                TimerEvent::Finished => {
                    info!(
                        "{}: finished after {} ms",
                        label.trim_end(),
                        now.saturating_sub(started)
                    );
                    return Ok(());
                }
            }

            let delay = session.next_poll_delay_ms(
                self.panel.now_ms(),
                self.timing.min_poll_ms,
                self.timing.max_poll_ms,
                self.timing.pause_poll_ms,
            );
            self.panel.sleep(delay)?;
        }
    }
}
