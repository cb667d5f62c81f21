//! Engine configuration.
//!
//! Every field has a serde default so a partial (or empty) JSON document
//! yields a usable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SoundCategory;

/// Default number of players built per sound.
pub const DEFAULT_PLAYERS_PER_SOUND: usize = 5;

/// Default settings key for the persisted disable flag.
pub const DEFAULT_SETTINGS_KEY: &str = "soundpool.sound.disabled";

fn default_players_per_sound() -> usize {
    DEFAULT_PLAYERS_PER_SOUND
}

fn default_settings_key() -> String {
    DEFAULT_SETTINGS_KEY.to_string()
}

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Process-wide engine settings.
///
/// # Example
///
/// ```
/// use soundpool::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.players_per_sound, 5);
/// assert_eq!(config.settings_key, "soundpool.sound.disabled");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Players built for every sound. Values below 1 are treated as 1.
    #[serde(default = "default_players_per_sound")]
    pub players_per_sound: usize,

    /// Session category applied before the first sound is built.
    #[serde(default)]
    pub category: SoundCategory,

    /// Settings key holding the persisted *disabled* flag.
    #[serde(default = "default_settings_key")]
    pub settings_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            players_per_sound: default_players_per_sound(),
            category: SoundCategory::default(),
            settings_key: default_settings_key(),
        }
    }
}

impl EngineConfig {
    /// Returns a copy with a different pool size.
    #[must_use]
    pub fn with_players_per_sound(mut self, players: usize) -> Self {
        self.players_per_sound = players;
        self
    }

    /// Returns a copy with a different session category.
    #[must_use]
    pub fn with_category(mut self, category: SoundCategory) -> Self {
        self.category = category;
        self
    }

    /// Returns a copy with a different settings key.
    #[must_use]
    pub fn with_settings_key(mut self, key: impl Into<String>) -> Self {
        self.settings_key = key.into();
        self
    }

    /// Pool size with the minimum of one applied.
    #[must_use]
    pub fn effective_players_per_sound(&self) -> usize {
        self.players_per_sound.max(1)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the settings key is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settings_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "settings_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::from_json_str(&contents)
    }
}
