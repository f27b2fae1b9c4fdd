use clap::Parser;
use std::path::PathBuf;

use tintlog::{ColorMode, Flags, Level};

fn parse_level(s: &str) -> Result<Level, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_flags(s: &str) -> Result<Flags, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "tintlog")]
#[command(about = "Write leveled, optionally colored log lines")]
#[command(
    long_about = "Write leveled, optionally colored log lines\n\nEach MESSAGE argument list becomes one line. Without a message, every line read from stdin is logged separately.\n\nLINE FORMAT:\n  [color]LEVEL NAME [date ][time[.micros] ][file:line: ]message[reset]"
)]
#[command(version)]
#[command(author = "Dirk Loss <mail@dirk-loss.de>")]
pub struct Cli {
    /// Message words, joined with spaces
    pub message: Vec<String>,

    /// Severity of the logged lines
    #[arg(short = 'l', long = "level", default_value = "info", value_parser = parse_level, help_heading = "Message Options")]
    pub level: Level,

    /// Explicit color for the lines (ignored for error and fatal, which are always red)
    #[arg(long = "color-name", help_heading = "Message Options")]
    pub color_name: Option<String>,

    /// Logger name written after the level
    #[arg(short = 'n', long = "name", default_value = "tintlog", help_heading = "Logger Options")]
    pub name: String,

    /// Minimum severity that is written
    #[arg(long = "min-level", value_parser = parse_level, help_heading = "Logger Options")]
    pub min_level: Option<Level>,

    /// Severity at which tintlog stops and exits with status 1
    #[arg(long = "escalate", value_parser = parse_level, help_heading = "Logger Options")]
    pub escalate: Option<Level>,

    /// Header fields: date,time,micro,longfile,shortfile,std,none
    #[arg(long = "flags", value_parser = parse_flags, help_heading = "Logger Options")]
    pub flags: Option<Flags>,

    /// Append lines to this file instead of stdout
    #[arg(short = 'o', long = "output", help_heading = "Output Options")]
    pub output: Option<PathBuf>,

    /// When to emit color escape sequences
    #[arg(long = "color", value_enum, help_heading = "Output Options")]
    pub color: Option<ColorMode>,

    /// JSON file mapping message text to colors
    #[arg(long = "color-rules", help_heading = "Output Options")]
    pub color_rules: Option<PathBuf>,

    /// Read settings from this file instead of the default locations
    #[arg(long = "config", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Do not read any config file
    #[arg(long = "ignore-config", conflicts_with = "config", help_heading = "Configuration")]
    pub ignore_config: bool,
}
