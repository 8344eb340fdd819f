#![allow(clippy::module_name_repetitions)]
//! Color mode configuration and ANSI painting for operator-facing stderr lines.
//!
//! Structured events go through `logging::Logger`; the helpers here only
//! cover raw text echoed for the operator, such as the captured output of a
//! failed `docker exec`.

use clap::ValueEnum;
use once_cell::sync::OnceCell;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

static COLOR_MODE: OnceCell<ColorMode> = OnceCell::new();

pub fn set_color_mode(mode: ColorMode) {
    let _ = COLOR_MODE.set(mode);
}

fn parse_color_mode(s: &str) -> Option<ColorMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(ColorMode::Auto),
        "always" | "on" | "true" | "yes" => Some(ColorMode::Always),
        "never" | "off" | "false" | "no" => Some(ColorMode::Never),
        _ => None,
    }
}

fn color_enabled_for(is_tty: bool) -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    let mode = COLOR_MODE.get().copied().or_else(|| {
        std::env::var("DIB_COLOR")
            .ok()
            .and_then(|v| parse_color_mode(&v))
    });
    match mode {
        Some(ColorMode::Always) => true,
        Some(ColorMode::Never) => false,
        Some(ColorMode::Auto) | None => is_tty,
    }
}

pub fn color_enabled_stderr() -> bool {
    color_enabled_for(atty::is(atty::Stream::Stderr))
}

/// Wrap string with ANSI color code when enabled; otherwise return unchanged.
pub fn paint(enabled: bool, code: &str, s: &str) -> String {
    if enabled {
        format!("{code}{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

/// Echo the captured output of a failed engine call: stdout in yellow,
/// stderr in bold red. Blank streams are skipped.
pub fn echo_failed_output(stdout: &str, stderr: &str) {
    let use_color = color_enabled_stderr();
    for (text, code) in [(stdout, "\x1b[33m"), (stderr, "\x1b[31;1m")] {
        let text = text.trim_end();
        if !text.trim().is_empty() {
            eprintln!("{}", paint(use_color, code, text));
        }
    }
}
