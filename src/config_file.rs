use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::config::LoggerSettings;

const SECTION_PREFIX: &str = "logger.";

/// Configuration file handler for tintlog
///
/// ```ini
/// ; applies to every logger
/// level = info
/// flags = date,time,shortfile
/// color_rules = colors.json
///
/// [logger.net]
/// level = debug
/// output = net.log
/// ```
#[derive(Debug, Default)]
pub struct ConfigFile {
    pub root: LoggerSettings,
    pub loggers: HashMap<String, LoggerSettings>,
}

impl ConfigFile {
    /// Find project-level .tintlogrc by walking up directory tree
    pub fn find_project_config() -> Option<PathBuf> {
        let mut current = env::current_dir().ok()?;
        loop {
            let config_path = current.join(".tintlogrc");
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                // Reached filesystem root
                break;
            }
        }
        None
    }

    /// Get list of user config file locations in order of preference
    pub fn get_user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if cfg!(windows) {
            if let Ok(appdata) = env::var("APPDATA") {
                paths.push(PathBuf::from(appdata).join("tintlog").join("config.ini"));
            }
            if let Ok(userprofile) = env::var("USERPROFILE") {
                paths.push(PathBuf::from(userprofile).join(".tintlogrc"));
            }
        } else {
            let xdg_config = env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    env::var("HOME")
                        .map(|h| PathBuf::from(h).join(".config"))
                        .unwrap_or_else(|_| PathBuf::from(".config"))
                });

            paths.push(xdg_config.join("tintlog").join("config.ini"));

            if let Ok(home) = env::var("HOME") {
                paths.push(PathBuf::from(home).join(".tintlogrc"));
            }
        }

        paths
    }

    /// Load configuration with proper precedence: project > user > defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // First existing user config has the lowest precedence
        if let Some(path) = Self::get_user_config_paths()
            .into_iter()
            .find(|p| p.exists())
        {
            config = Self::merge_configs(config, Self::load_from_path(&path)?);
        }

        if let Some(project_path) = Self::find_project_config() {
            config = Self::merge_configs(config, Self::load_from_path(&project_path)?);
        }

        Ok(config)
    }

    /// Load configuration with optional custom config file path
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path. Relative file paths inside
    /// the config are taken relative to the config file's directory.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::parse_ini_content(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            config.root.resolve_paths(base);
            for settings in config.loggers.values_mut() {
                settings.resolve_paths(base);
            }
        }

        Ok(config)
    }

    /// Parse INI content from string
    pub fn parse_ini_content(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut current_section: Option<String> = None;

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = Some(line[1..line.len() - 1].trim().to_string());
                continue;
            }

            let Some(eq_pos) = line.find('=') else {
                return Err(anyhow!("Line {}: expected 'key = value'", index + 1));
            };
            let key = line[..eq_pos].trim();
            let value = line[eq_pos + 1..].trim();

            let target = match current_section.as_deref() {
                None => &mut config.root,
                Some(section) => match section.strip_prefix(SECTION_PREFIX) {
                    Some(name) if !name.is_empty() => {
                        config.loggers.entry(name.to_string()).or_default()
                    }
                    // Ignore unknown sections
                    _ => continue,
                },
            };

            target
                .set(key, value)
                .with_context(|| format!("Line {}", index + 1))?;
        }

        Ok(config)
    }

    /// Merge two configuration objects, with the second taking precedence
    fn merge_configs(base: Self, overlay: Self) -> Self {
        let mut loggers = base.loggers;
        for (name, settings) in overlay.loggers {
            let merged = match loggers.remove(&name) {
                Some(existing) => existing.merge(settings),
                None => settings,
            };
            loggers.insert(name, merged);
        }
        Self {
            root: base.root.merge(overlay.root),
            loggers,
        }
    }

    /// Effective settings for the logger called `name`
    pub fn settings_for(&self, name: &str) -> LoggerSettings {
        let mut settings = self.root.clone();
        // Rule files are shared through the registry, not per logger
        settings.color_rules = None;
        match self.loggers.get(name) {
            Some(specific) => settings.merge(specific.clone()),
            None => settings,
        }
    }
}
