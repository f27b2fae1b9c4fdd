use anyhow::{anyhow, Result};

use crate::level::Level;

/// Escape sequence that ends every colored line
pub const RESET: &str = "\x1b[0m";

/// ANSI colors a log line can be wrapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    None,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Purple,
    DarkGreen,
    White,
}

impl Color {
    /// Escape sequence written ahead of a colored line
    pub fn prefix(self) -> &'static str {
        match self {
            Color::None => "",
            Color::Black => "\x1b[30m",     // Black foreground
            Color::Red => "\x1b[31m",       // Red, forced for error and fatal
            Color::Green => "\x1b[32m",     // Green
            Color::Yellow => "\x1b[33m",    // Yellow, default for warn
            Color::Blue => "\x1b[34m",      // Blue
            Color::Purple => "\x1b[35m",    // Magenta
            Color::DarkGreen => "\x1b[36m", // Cyan
            Color::White => "\x1b[37m",     // White, fallback for unknown names
        }
    }

    /// Escape sequence written after a colored line (empty for `None`)
    pub fn suffix(self) -> &'static str {
        if self.is_none() {
            ""
        } else {
            RESET
        }
    }

    pub fn is_none(self) -> bool {
        self == Color::None
    }

    /// Look up a color by its name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name.trim().to_ascii_lowercase().as_str() {
            "none" => Color::None,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "purple" | "magenta" => Color::Purple,
            "darkgreen" | "cyan" => Color::DarkGreen,
            "white" => Color::White,
            _ => return None,
        };
        Some(color)
    }

    /// Like `from_name`, but unknown names are an error
    pub fn parse_name(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| anyhow!("Unknown color name '{}'", name))
    }

    /// Default color for each severity
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Warn => Color::Yellow,
            Level::Error | Level::Fatal => Color::Red,
            Level::Debug | Level::Info => Color::None,
        }
    }
}
