use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How an option choice turns into an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Selecting an option submits it.
    #[default]
    Immediate,
    /// Selecting marks a pending choice; `submit` confirms it. A pending
    /// choice is submitted automatically when the countdown runs out.
    Deferred,
}

impl SelectionMode {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(Self::Immediate),
            "deferred" => Ok(Self::Deferred),
            _ => Err(ConfigError::InvalidSelectionMode(raw.to_string())),
        }
    }
}

/// Runtime knobs for a quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSettings {
    pub tick_interval: Duration,
    pub grace_period: Duration,
    pub selection_mode: SelectionMode,
    /// Move to the next question as soon as an answer is submitted.
    pub auto_advance_after_answer: bool,
    /// Shuffle questions after every load.
    pub shuffle: bool,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            grace_period: Duration::from_millis(1500),
            selection_mode: SelectionMode::Immediate,
            auto_advance_after_answer: false,
            shuffle: false,
        }
    }
}

impl QuizSettings {
    /// Defaults overridden by `QUIZ_TICK_MS`, `QUIZ_GRACE_MS`,
    /// `QUIZ_SELECTION_MODE`, `QUIZ_AUTO_ADVANCE` and `QUIZ_SHUFFLE`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`QuizSettings::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(raw) = lookup("QUIZ_TICK_MS") {
            settings.tick_interval = parse_millis("QUIZ_TICK_MS", &raw)?;
        }
        if let Some(raw) = lookup("QUIZ_GRACE_MS") {
            settings.grace_period = parse_millis("QUIZ_GRACE_MS", &raw)?;
        }
        if let Some(raw) = lookup("QUIZ_SELECTION_MODE") {
            settings.selection_mode = SelectionMode::parse(&raw)?;
        }
        if let Some(raw) = lookup("QUIZ_AUTO_ADVANCE") {
            settings.auto_advance_after_answer = parse_flag("QUIZ_AUTO_ADVANCE", &raw)?;
        }
        if let Some(raw) = lookup("QUIZ_SHUFFLE") {
            settings.shuffle = parse_flag("QUIZ_SHUFFLE", &raw)?;
        }

        Ok(settings)
    }

    #[must_use]
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    #[must_use]
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance_after_answer = enabled;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

fn parse_millis(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidDuration {
            var,
            raw: raw.to_string(),
        }),
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            raw: raw.to_string(),
        }),
    }
}
