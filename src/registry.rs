//! Named collection of loggers
//!
//! The application owns a `Registry` and uses it to adjust levels, flags
//! and colors of many loggers at once, e.g. from a config file or an admin
//! command.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::color_rules::ColorRules;
use crate::config_file::ConfigFile;
use crate::header::Flags;
use crate::level::Level;
use crate::logger::Logger;

/// Selects loggers by name: `*` for all, otherwise an anchored regex
enum NamePattern {
    All,
    Regex(Regex),
}

impl NamePattern {
    fn parse(pattern: &str) -> Result<Self> {
        if pattern == "*" {
            return Ok(NamePattern::All);
        }
        let re = Regex::new(&format!("^(?:{})$", pattern))
            .with_context(|| format!("Invalid logger name pattern '{}'", pattern))?;
        Ok(NamePattern::Regex(re))
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NamePattern::All => true,
            NamePattern::Regex(re) => re.is_match(name),
        }
    }
}

#[derive(Default)]
pub struct Registry {
    loggers: RwLock<Vec<Arc<Logger>>>,
    color_rules: RwLock<Option<Arc<ColorRules>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a logger and register it
    pub fn create(&self, name: &str) -> Arc<Logger> {
        let logger = Arc::new(Logger::new(name));
        self.register(Arc::clone(&logger));
        logger
    }

    /// Add an existing logger; it picks up the registry's color rules
    pub fn register(&self, logger: Arc<Logger>) {
        // Lock order is loggers, then rules.
        let mut loggers = self.write_loggers();
        if let Some(rules) = self.read_rules().as_ref() {
            logger.set_color_resolver(rules);
        }
        loggers.push(logger);
    }

    /// First registered logger with this exact name
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.read_loggers()
            .iter()
            .find(|logger| logger.name() == name)
            .cloned()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        self.read_loggers()
            .iter()
            .map(|logger| logger.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_loggers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_loggers().is_empty()
    }

    fn read_loggers(&self) -> RwLockReadGuard<'_, Vec<Arc<Logger>>> {
        self.loggers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_loggers(&self) -> RwLockWriteGuard<'_, Vec<Arc<Logger>>> {
        self.loggers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read_rules(&self) -> RwLockReadGuard<'_, Option<Arc<ColorRules>>> {
        self.color_rules
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` on every logger whose name matches `pattern`.
    /// Returns the number of loggers visited; zero is an error.
    pub fn visit<F>(&self, pattern: &str, mut f: F) -> Result<usize>
    where
        F: FnMut(&Logger) -> Result<()>,
    {
        let matcher = NamePattern::parse(pattern)?;
        let mut visited = 0;
        for logger in self.read_loggers().iter() {
            if matcher.matches(logger.name()) {
                f(logger)?;
                visited += 1;
            }
        }
        if visited == 0 {
            return Err(anyhow!("No logger matches '{}'", pattern));
        }
        Ok(visited)
    }

    pub fn set_level(&self, pattern: &str, level: Level) -> Result<usize> {
        self.visit(pattern, |logger| {
            logger.set_level(level);
            Ok(())
        })
    }

    pub fn set_level_by_name(&self, pattern: &str, level: &str) -> Result<usize> {
        self.set_level(pattern, level.parse()?)
    }

    pub fn set_escalation_level(&self, pattern: &str, level: Level) -> Result<usize> {
        self.visit(pattern, |logger| {
            logger.set_escalation_level(level);
            Ok(())
        })
    }

    pub fn set_flags(&self, pattern: &str, flags: Flags) -> Result<usize> {
        self.visit(pattern, |logger| {
            logger.set_flags(flags);
            Ok(())
        })
    }

    pub fn enable_color(&self, pattern: &str, enabled: bool) -> Result<usize> {
        self.visit(pattern, |logger| {
            logger.enable_color(enabled);
            Ok(())
        })
    }

    /// Keep `rules` alive and attach them to every current and future logger
    pub fn set_color_rules(&self, rules: Arc<ColorRules>) {
        // Held throughout so no logger can register between the two steps.
        let loggers = self.write_loggers();
        for logger in loggers.iter() {
            logger.set_color_resolver(&rules);
        }
        *self
            .color_rules
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(rules);
    }

    /// Apply root and per-logger settings from a config file
    pub fn apply_config(&self, config: &ConfigFile) -> Result<()> {
        if let Some(path) = &config.root.color_rules {
            let rules = ColorRules::load_from_path(path)?;
            self.set_color_rules(Arc::new(rules));
        }
        for logger in self.read_loggers().iter() {
            config
                .settings_for(logger.name())
                .apply(logger)
                .with_context(|| format!("Failed to configure logger '{}'", logger.name()))?;
        }
        Ok(())
    }
}
