use crate::develop::PushPullOption;
use crate::types::Button;

pub const LCD_COLUMNS: usize = 20;
pub const LCD_ROWS: usize = 4;

pub type Frame = [String; LCD_ROWS];

pub fn fit_line(text: &str) -> String {
    let mut line: String = text.chars().take(LCD_COLUMNS).collect();
    let width = line.chars().count();
    line.extend(std::iter::repeat(' ').take(LCD_COLUMNS - width));
    line
}

pub fn format_mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn frame(lines: [&str; LCD_ROWS]) -> Frame {
    lines.map(fit_line)
}

pub fn welcome() -> Frame {
    frame([
        "********************",
        "*     Welcome!     *",
        "* Press 1 to begin *",
        "********************",
    ])
}

pub fn stage_finished() -> Frame {
    frame([
        "   Stage finished   ",
        " Choose next stage: ",
        "1 Dev   3 Fixer",
        "2 Stop  4 Photoflo",
    ])
}

pub fn invalid_stage() -> Frame {
    frame(["", "Invalid stage!", "", ""])
}

pub fn paused() -> Frame {
    frame([
        "********************",
        "*      PAUSED      *",
        "*  Hold to resume  *",
        "********************",
    ])
}

pub fn run_complete() -> Frame {
    frame([
        "  You're all done!  ",
        "--------------------",
        " Press any button",
        "   to restart",
    ])
}

pub fn temperature_line(reading_c: Option<f32>) -> String {
    match reading_c {
        Some(temp) => fit_line(&format!("Temp: {temp:4.1} C")),
        None => fit_line("Temp: unknown"),
    }
}

pub fn countdown_line(seconds: u64) -> String {
    fit_line(&format!("{} left", format_mm_ss(seconds)))
}

pub fn pause_hint(button: Button) -> String {
    fit_line(&format!("Hold {button} to pause"))
}

pub fn countdown(label: &str, reading_c: Option<f32>, seconds: u64, button: Button) -> Frame {
    [
        fit_line(label),
        temperature_line(reading_c),
        countdown_line(seconds),
        pause_hint(button),
    ]
}

pub fn develop_label(option: &PushPullOption) -> String {
    let level = option.stops_label();
    let width = LCD_COLUMNS.saturating_sub(level.len());
    let name: String = "Developing...".chars().take(width).collect();
    format!("{name:<width$}{level}")
}

pub fn develop_time(seconds: u32) -> Frame {
    frame([
        "Set dev time",
        &format!("{} (mm:ss)", format_mm_ss(u64::from(seconds))),
        "Rotate to adjust",
        "Press knob to set",
    ])
}

pub fn push_pull(option: &PushPullOption) -> Frame {
    frame([
        "Push/Pull setting",
        &option.label,
        &format!("Factor: x{:.1}", option.factor),
        "Press knob to set",
    ])
}

pub fn develop_saved(base_seconds: u32, option: &PushPullOption, adjusted_seconds: u32) -> Frame {
    frame([
        "Dev settings saved",
        &format!("Base: {}", format_mm_ss(u64::from(base_seconds))),
        &format!("Mode: {}", option.label),
        &format!("Run: {}", format_mm_ss(u64::from(adjusted_seconds))),
    ])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn lines_are_exactly_one_row_wide() {
        assert_eq!(fit_line("abc"), format!("abc{}", " ".repeat(17)));
        assert_eq!(fit_line("123456789012345678901234"), "12345678901234567890");
        assert_eq!(fit_line(""), " ".repeat(20));
        assert!(welcome().iter().all(|line| line.chars().count() == LCD_COLUMNS));
    }

    #[test]
    fn countdown_frame_shows_label_temp_time_and_hint() {
        let frame = countdown("Stop bath", Some(20.3), 125, Button::Two);
        assert_eq!(
            frame,
            [
                fit_line("Stop bath"),
                fit_line("Temp: 20.3 C"),
                fit_line("02:05 left"),
                fit_line("Hold 2 to pause"),
            ]
        );
    }

    #[test]
    fn missing_reading_is_shown_as_unknown() {
        assert_eq!(temperature_line(None), fit_line("Temp: unknown"));
    }

    #[test]
    fn develop_label_right_aligns_stop_level() {
        let push = PushPullOption::new("Push 1", 1, 1.2);
        let pull = PushPullOption::new("Pull 2", -2, 0.6);
        let normal = PushPullOption::new("Normal", 0, 1.0);

        assert_eq!(develop_label(&push), "Developing...     +1");
        assert_eq!(develop_label(&pull), "Developing...     -2");
        assert_eq!(develop_label(&normal), "Developing...      0");
        assert_eq!(develop_label(&push).chars().count(), LCD_COLUMNS);
    }

    #[test]
    fn long_durations_keep_minutes() {
        assert_eq!(format_mm_ss(3_600), "60:00");
        assert_eq!(format_mm_ss(59), "00:59");
    }
}
