use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead};
use std::sync::Arc;

use tintlog::platform::{caused_by_broken_pipe, ExitCode};
use tintlog::tty::format_error_message_auto;
use tintlog::{
    Color, ColorMode, ColorRules, ConfigFile, Dispatch, Level, Logger, LoggerSettings, Message,
    Registry,
};

mod cli;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let color = match resolve_color(&cli) {
        Ok(color) => color,
        Err(e) => {
            eprintln!("{}", format_error_message_auto(&format!("{:#}", e)));
            ExitCode::InvalidUsage.exit();
        }
    };

    match run(&cli, color) {
        Ok(()) => ExitCode::Success.exit(),
        Err(e) if caused_by_broken_pipe(&e) => {
            // Broken pipe is normal in pipelines - exit quietly
            ExitCode::SignalPipe.exit();
        }
        Err(e) => {
            eprintln!("{}", format_error_message_auto(&format!("{:#}", e)));
            ExitCode::GeneralError.exit();
        }
    }
}

/// Explicit `--color-name`, or the level's default color
fn resolve_color(cli: &Cli) -> Result<Color> {
    match &cli.color_name {
        Some(name) => Color::parse_name(name),
        None => Ok(Color::for_level(cli.level)),
    }
}

/// Settings given on the command line; these win over any config file
fn cli_settings(cli: &Cli) -> LoggerSettings {
    LoggerSettings {
        level: cli.min_level,
        escalate: cli.escalate,
        flags: cli.flags,
        color: cli.color,
        output: cli.output.clone(),
        color_rules: cli.color_rules.clone(),
    }
}

fn run(cli: &Cli, color: Color) -> Result<()> {
    let config = if cli.ignore_config {
        ConfigFile::default()
    } else {
        ConfigFile::load_with_custom_path(cli.config.as_deref())?
    };

    let registry = Registry::new();
    let rules_path = cli.color_rules.as_ref().or(config.root.color_rules.as_ref());
    if let Some(path) = rules_path {
        registry.set_color_rules(Arc::new(ColorRules::load_from_path(path)?));
    }

    let logger = registry.create(&cli.name);
    let mut settings = config.settings_for(&cli.name).merge(cli_settings(cli));
    settings.color.get_or_insert(ColorMode::Auto);
    settings
        .apply(&logger)
        .with_context(|| format!("Failed to configure logger '{}'", cli.name))?;

    if !cli.message.is_empty() {
        return log_line(&logger, color, cli.level, &cli.message.join(" "));
    }

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read stdin")?;
        log_line(&logger, color, cli.level, &line)?;
    }
    Ok(())
}

fn log_line(logger: &Logger, color: Color, level: Level, text: &str) -> Result<()> {
    match logger.log(color, level, Message::Format(format_args!("{}", text))) {
        Dispatch::Suppressed | Dispatch::Written => Ok(()),
        Dispatch::Failed(e) => Err(e),
        Dispatch::Escalated(escalation) => {
            if let Some(e) = &escalation.write_error {
                eprintln!("{}", format_error_message_auto(&format!("{:#}", e)));
            }
            eprintln!("{}", format_error_message_auto(&escalation.to_string()));
            escalation.exit()
        }
    }
}
