use std::io::IsTerminal;

use crate::config::ColorMode;

/// Check if stderr is connected to a TTY
pub fn is_stderr_tty() -> bool {
    std::io::stderr().is_terminal()
}

/// Determine if colors should be used for a destination, given the color
/// mode and whether that destination is a terminal
pub fn should_use_colors_with_mode(color_mode: ColorMode, is_terminal: bool) -> bool {
    decide(
        color_mode,
        is_terminal,
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var_os("FORCE_COLOR").is_some(),
    )
}

fn decide(color_mode: ColorMode, is_terminal: bool, no_color: bool, force_color: bool) -> bool {
    match color_mode {
        ColorMode::Never => false,
        // Even with Always, respect NO_COLOR (https://no-color.org/)
        ColorMode::Always => !no_color,
        ColorMode::Auto => {
            if no_color {
                return false;
            }
            // FORCE_COLOR covers CI environments that render colors
            force_color || is_terminal
        }
    }
}

/// Format an error message for stderr, in red when stderr is a terminal
pub fn format_error_message_auto(message: &str) -> String {
    format_error_message(
        message,
        should_use_colors_with_mode(ColorMode::Auto, is_stderr_tty()),
    )
}

pub fn format_error_message(message: &str, use_colors: bool) -> String {
    if use_colors {
        format!("\x1b[31mtintlog: {}\x1b[0m", message)
    } else {
        format!("tintlog: {}", message)
    }
}
