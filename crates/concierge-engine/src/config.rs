//! Configuration types for the concierge engine.
//!
//! This module defines the configuration schema: the property profile, the
//! canned assistant texts, and how assistant replies are produced.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::property::PropertyProfile;

/// Main configuration for concierge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Property shown in the details panel and named in quick-invest prompts.
    #[serde(default)]
    pub property: PropertyProfile,

    /// Content of the seeded assistant welcome message.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,

    /// Hint shown while the conversation holds only the welcome message.
    #[serde(default = "default_empty_hint")]
    pub empty_hint: String,

    /// Placeholder shown in the empty input box.
    #[serde(default = "default_input_placeholder")]
    pub input_placeholder: String,

    /// Reply production settings.
    #[serde(default)]
    pub reply: ReplyConfig,
}

fn default_welcome_message() -> String {
    "Welcome to Manhattan Prime Properties. I'm here to help you invest in the Midtown \
     Executive Tower. This premium Class A office building offers excellent returns with a \
     7.2% annual yield and 98% occupancy rate. With tokens starting at just $10, you can \
     begin building your real estate portfolio today."
        .into()
}

fn default_empty_hint() -> String {
    "Ask about investment strategies, property details, or place your order...".into()
}

fn default_input_placeholder() -> String {
    "Ask about the property, investment terms, or how to purchase tokens...".into()
}

/// How assistant replies are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMode {
    /// Fixed acknowledgment after a fixed delay.
    #[default]
    Simulated,
    /// Forward each submission to an external conversation service.
    Service,
}

impl std::fmt::Display for ReplyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Service => write!(f, "service"),
        }
    }
}

/// Reply settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Which reply path is active.
    #[serde(default)]
    pub mode: ReplyMode,

    /// Delay before the simulated acknowledgment appears.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Simulated acknowledgment text (independent of what the user said).
    #[serde(default = "default_acknowledgment")]
    pub acknowledgment: String,

    /// Prefix of the assistant message reporting a service failure.
    #[serde(default = "default_failure_prefix")]
    pub failure_prefix: String,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_acknowledgment() -> String {
    "Thank you for your interest. I can provide more details about the investment \
     opportunity, help you calculate potential returns, or assist with the token purchase \
     process. What would you like to know?"
        .into()
}

fn default_failure_prefix() -> String {
    "Sorry, I couldn't reach the investment assistant".into()
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            mode: ReplyMode::default(),
            delay_ms: default_delay_ms(),
            acknowledgment: default_acknowledgment(),
            failure_prefix: default_failure_prefix(),
        }
    }
}

impl ReplyConfig {
    /// Simulated reply delay.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            property: PropertyProfile::default(),
            welcome_message: default_welcome_message(),
            empty_hint: default_empty_hint(),
            input_placeholder: default_input_placeholder(),
            reply: ReplyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration if the file exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Check the canned texts that must never be blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.welcome_message.trim().is_empty() {
            return Err(ConfigError::Invalid("welcome_message must not be blank".into()));
        }
        if self.reply.acknowledgment.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "reply.acknowledgment must not be blank".into(),
            ));
        }
        if self.property.name.trim().is_empty() {
            return Err(ConfigError::Invalid("property.name must not be blank".into()));
        }
        Ok(())
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Config parsed but holds an unusable value.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reply.mode, ReplyMode::Simulated);
        assert_eq!(config.reply.delay(), Duration::from_millis(1000));
        assert!(config.welcome_message.starts_with("Welcome to Manhattan Prime Properties"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_reply_mode_serialization() {
        let config: Config =
            serde_json::from_str(r#"{"reply": {"mode": "service", "delay_ms": 250}}"#).unwrap();
        assert_eq!(config.reply.mode, ReplyMode::Service);
        assert_eq!(config.reply.delay_ms, 250);
        assert_eq!(config.reply.acknowledgment, default_acknowledgment());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".concierge").join("config.json");

        let mut config = Config::default();
        config.property.name = "Harbor Point Lofts".into();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_blank_acknowledgment_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"reply": {"acknowledgment": "   "}}"#).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
