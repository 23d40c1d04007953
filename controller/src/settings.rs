use darkroom_common::{
    screen, DevelopConfig, DevelopDial, DevelopSettings, DialStep, PushPullOption, TimingConfig,
};
use tracing::info;

use crate::{error::ControlResult, panel::Panel};

#[derive(Debug, Clone, PartialEq)]
pub struct DevelopChoice {
    pub settings: DevelopSettings,
    pub option: PushPullOption,
    pub adjusted_seconds: u32,
}

pub fn choose_develop_settings(
    panel: &mut Panel,
    develop: &DevelopConfig,
    timing: &TimingConfig,
) -> ControlResult<DevelopChoice> {
    let options = &develop.push_pull;
    let defaults = develop.default_settings();
    let mut dial = DevelopDial::new(defaults.base_seconds, defaults.option_index, options.len());

    // Steps turned before the dialog opened are not meant for it.
    panel.encoder_delta();
    panel.clear();
    panel.show(&screen::develop_time(dial.base_seconds()));

    while dial.step() != DialStep::Confirmed {
        panel.check()?;

        let delta = panel.encoder_delta();
        if dial.rotate(delta) {
            redraw(panel, &dial, options);
        }

        if panel.encoder_pressed() {
            let step = dial.confirm();
            panel.hold(timing.knob_debounce_ms)?;
            panel.wait_for_knob_release()?;
            if step == DialStep::PushPull {
                panel.clear();
                redraw(panel, &dial, options);
            }
            continue;
        }

        panel.sleep(timing.input_poll_ms)?;
    }

    let settings = dial.settings();
    let option = options
        .get(settings.option_index)
        .cloned()
        .unwrap_or_else(|| PushPullOption::new("Normal", 0, 1.0));
    let adjusted_seconds = settings.adjusted_seconds(options);
    info!(
        "develop settings: base {} s, {} ({:+}), run {adjusted_seconds} s",
        settings.base_seconds, option.label, option.stops
    );

    panel.clear();
    panel.show(&screen::develop_saved(
        settings.base_seconds,
        &option,
        adjusted_seconds,
    ));
    panel.hold(timing.settings_summary_ms)?;
    panel.clear();

    Ok(DevelopChoice {
        settings,
        option,
        adjusted_seconds,
    })
}

fn redraw(panel: &mut Panel, dial: &DevelopDial, options: &[PushPullOption]) {
    match dial.step() {
        DialStep::BaseTime => panel.show(&screen::develop_time(dial.base_seconds())),
        DialStep::PushPull => {
            if let Some(option) = options.get(dial.option_index()) {
                panel.show(&screen::push_pull(option));
            }
        }
        DialStep::Confirmed => {}
    }
}
