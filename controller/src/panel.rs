use std::sync::Arc;

use darkroom_common::{screen::Frame, Button};
use tracing::warn;

use crate::{
    error::{ControlResult, Shutdown},
    hal::{Clock, Display, Input},
};

pub struct Panel {
    display: Box<dyn Display>,
    input: Box<dyn Input>,
    clock: Arc<dyn Clock>,
    shutdown: Shutdown,
    poll_ms: u64,
}

impl Panel {
    pub fn new(
        display: Box<dyn Display>,
        input: Box<dyn Input>,
        clock: Arc<dyn Clock>,
        shutdown: Shutdown,
        poll_ms: u64,
    ) -> Self {
        Self {
            display,
            input,
            clock,
            shutdown,
            poll_ms: poll_ms.max(1),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn check(&self) -> ControlResult<()> {
        self.shutdown.check()
    }

    pub fn show(&mut self, frame: &Frame) {
        for (row, text) in (1u8..).zip(frame.iter()) {
            if let Err(err) = self.display.write_line(row, text) {
                warn!("display write failed on line {row}: {err:#}");
                return;
            }
        }
    }

    pub fn clear(&mut self) {
        if let Err(err) = self.display.clear() {
            warn!("display clear failed: {err:#}");
        }
    }

    pub fn button_pressed(&mut self, button: Button) -> bool {
        self.input.button_pressed(button)
    }

    pub fn detect_button(&mut self) -> Option<Button> {
        Button::ALL
            .into_iter()
            .find(|button| self.input.button_pressed(*button))
    }

    pub fn encoder_delta(&mut self) -> i32 {
        self.input.encoder_delta()
    }

    pub fn encoder_pressed(&mut self) -> bool {
        self.input.encoder_pressed()
    }

    pub fn wait_for_button(&mut self) -> ControlResult<Button> {
        let button = loop {
            self.check()?;
            if let Some(button) = self.detect_button() {
                break button;
            }
            self.clock.sleep_ms(self.poll_ms);
        };
        while self.input.button_pressed(button) {
            self.check()?;
            self.clock.sleep_ms(self.poll_ms);
        }
        Ok(button)
    }

    pub fn wait_for_knob_release(&mut self) -> ControlResult<()> {
        while self.input.encoder_pressed() {
            self.check()?;
            self.clock.sleep_ms(self.poll_ms);
        }
        Ok(())
    }

    pub fn hold(&self, ms: u64) -> ControlResult<()> {
        let deadline = self.clock.now_ms().saturating_add(ms);
        loop {
            self.check()?;
            let now = self.clock.now_ms();
            if now >= deadline {
                return Ok(());
            }
            self.clock.sleep_ms((deadline - now).min(self.poll_ms));
        }
    }

    pub fn sleep(&self, ms: u64) -> ControlResult<()> {
        self.check()?;
        self.clock.sleep_ms(ms);
        Ok(())
    }

    pub fn release(&mut self) {
        if let Err(err) = self.display.clear() {
            warn!("display clear failed during teardown: {err:#}");
        }
        if let Err(err) = self.display.release() {
            warn!("failed to release display: {err:#}");
        }
        if let Err(err) = self.input.release() {
            warn!("failed to release input: {err:#}");
        }
    }
}
