//! Per-logger settings shared by the config file and the command line

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::header::Flags;
use crate::level::Level;
use crate::logger::Logger;

/// Color output mode
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" | "on" | "true" => Ok(ColorMode::Always),
            "never" | "off" | "false" => Ok(ColorMode::Never),
            other => Err(anyhow!(
                "Unknown color mode '{}' (expected auto, always or never)",
                other
            )),
        }
    }
}

/// Settings for one logger; unset fields leave the logger untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoggerSettings {
    pub level: Option<Level>,
    pub escalate: Option<Level>,
    pub flags: Option<Flags>,
    pub color: Option<ColorMode>,
    pub output: Option<PathBuf>,
    /// Only honoured at the root of a config file
    pub color_rules: Option<PathBuf>,
}

impl LoggerSettings {
    /// Parse and store one `key = value` pair. Unknown keys are ignored and
    /// reported as `false`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        let context = || format!("Invalid value for '{}'", key);
        match key {
            "level" => self.level = Some(value.parse::<Level>().with_context(context)?),
            "escalate" => self.escalate = Some(value.parse::<Level>().with_context(context)?),
            "flags" => self.flags = Some(value.parse::<Flags>().with_context(context)?),
            "color" => self.color = Some(value.parse::<ColorMode>().with_context(context)?),
            "output" => self.output = Some(non_empty_path(key, value)?),
            "color_rules" => self.color_rules = Some(non_empty_path(key, value)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Combine two settings, with `overlay` taking precedence
    pub fn merge(self, overlay: LoggerSettings) -> LoggerSettings {
        LoggerSettings {
            level: overlay.level.or(self.level),
            escalate: overlay.escalate.or(self.escalate),
            flags: overlay.flags.or(self.flags),
            color: overlay.color.or(self.color),
            output: overlay.output.or(self.output),
            color_rules: overlay.color_rules.or(self.color_rules),
        }
    }

    /// Make relative paths relative to `base`
    pub(crate) fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.output, &mut self.color_rules].into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Push these settings into `logger`. The output file is switched
    /// before the color decision so that `auto` sees the new destination.
    pub fn apply(&self, logger: &Logger) -> Result<()> {
        if let Some(level) = self.level {
            logger.set_level(level);
        }
        if let Some(level) = self.escalate {
            logger.set_escalation_level(level);
        }
        if let Some(flags) = self.flags {
            logger.set_flags(flags);
        }
        if let Some(path) = &self.output {
            logger.set_output_file(path)?;
        }
        if let Some(mode) = self.color {
            let enabled =
                crate::tty::should_use_colors_with_mode(mode, logger.destination_is_terminal());
            logger.enable_color(enabled);
        }
        Ok(())
    }
}

fn non_empty_path(key: &str, value: &str) -> Result<PathBuf> {
    if value.is_empty() {
        return Err(anyhow!("Invalid value for '{}': path is empty", key));
    }
    Ok(PathBuf::from(value))
}
