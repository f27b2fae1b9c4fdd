//! Text-driven color selection
//!
//! A `ColorRules` file maps message fragments to colors so that, for
//! example, every line mentioning a particular peer shows up in the same
//! color without the call site asking for it.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use crate::colors::Color;

/// Picks a color for a message that was logged without one
pub trait ColorResolver: Send + Sync {
    fn color_for(&self, text: &str) -> Color;
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(rename = "Rule", default)]
    rules: Vec<RawRule>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(rename = "Text")]
    text: String,
    #[serde(rename = "Color")]
    color: String,
    #[serde(rename = "Regex", default)]
    regex: bool,
}

#[derive(Debug)]
enum Matcher {
    Contains(String),
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Contains(fragment) => text.contains(fragment.as_str()),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }
}

#[derive(Debug)]
struct Rule {
    matcher: Matcher,
    color: Color,
}

/// Ordered list of text rules; the first matching rule wins
#[derive(Debug, Default)]
pub struct ColorRules {
    rules: Vec<Rule>,
}

impl ColorRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rules from JSON of the form
    /// `{"Rule": [{"Text": "...", "Color": "Red", "Regex": false}]}`
    pub fn from_json(content: &str) -> Result<Self> {
        let file: RuleFile =
            serde_json::from_str(content).context("Invalid color rule file")?;

        let mut rules = Self::new();
        for (index, raw) in file.rules.into_iter().enumerate() {
            let color = Color::from_name(&raw.color).ok_or_else(|| {
                anyhow!("Rule {}: unknown color name '{}'", index + 1, raw.color)
            })?;
            if raw.regex {
                rules
                    .push_pattern(&raw.text, color)
                    .with_context(|| format!("Rule {}: invalid regex", index + 1))?;
            } else {
                rules.push_text(raw.text, color);
            }
        }
        Ok(rules)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read color rule file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to load color rules from {}", path.display()))
    }

    /// Append a substring rule
    pub fn push_text(&mut self, fragment: impl Into<String>, color: Color) {
        self.rules.push(Rule {
            matcher: Matcher::Contains(fragment.into()),
            color,
        });
    }

    /// Append a regex rule
    pub fn push_pattern(&mut self, pattern: &str, color: Color) -> Result<()> {
        let re = Regex::new(pattern)?;
        self.rules.push(Rule {
            matcher: Matcher::Pattern(re),
            color,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl ColorResolver for ColorRules {
    fn color_for(&self, text: &str) -> Color {
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(text))
            .map(|rule| rule.color)
            .unwrap_or(Color::None)
    }
}
