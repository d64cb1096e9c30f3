//! Configuration management for deskmate
//!
//! Handles loading, saving, and default configuration values.
//! Config file location: ~/.config/deskmate/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default pomodoro length in minutes
pub const DEFAULT_TIMER_MINUTES: u32 = 25;

/// Longest pomodoro the timer accepts
pub const MAX_TIMER_MINUTES: u32 = 999;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: Language,
    pub timer: TimerOptions,
    pub storage: StorageOptions,
}

impl Config {
    /// Directory holding the config file
    pub fn dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("deskmate"))
    }

    /// Get the config file path
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dir()?.join("config.toml"))
    }

    /// Directory for persisted state and the log file
    pub fn data_dir() -> Result<PathBuf> {
        Ok(dirs::data_dir()
            .context("Could not determine data directory")?
            .join("deskmate"))
    }

    /// Load config from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Parse config text, clamping values the timer cannot honor
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.timer.duration_minutes = config.timer.validated_minutes();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Location of the preference store file
    pub fn storage_path(&self) -> Result<PathBuf> {
        match &self.storage.path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("storage.json")),
        }
    }
}

/// Language of the help text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

/// Pomodoro timer options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerOptions {
    pub duration_minutes: u32,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_TIMER_MINUTES,
        }
    }
}

impl TimerOptions {
    /// Configured duration, or the default when out of range
    pub fn validated_minutes(&self) -> u32 {
        if (1..=MAX_TIMER_MINUTES).contains(&self.duration_minutes) {
            self.duration_minutes
        } else {
            tracing::warn!(
                "timer.duration_minutes = {} is out of range, using {}",
                self.duration_minutes,
                DEFAULT_TIMER_MINUTES
            );
            DEFAULT_TIMER_MINUTES
        }
    }
}

/// Where persisted state lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language, Language::Es);
        assert_eq!(config.timer.duration_minutes, 25);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse("language = \"en\"\n").unwrap();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.timer.duration_minutes, DEFAULT_TIMER_MINUTES);

        let config = Config::parse("[timer]\nduration_minutes = 50\n").unwrap();
        assert_eq!(config.timer.duration_minutes, 50);
        assert_eq!(config.language, Language::Es);
    }

    #[test]
    fn test_out_of_range_duration_falls_back() {
        let config = Config::parse("[timer]\nduration_minutes = 0\n").unwrap();
        assert_eq!(config.timer.duration_minutes, DEFAULT_TIMER_MINUTES);

        let config = Config::parse("[timer]\nduration_minutes = 5000\n").unwrap();
        assert_eq!(config.timer.duration_minutes, DEFAULT_TIMER_MINUTES);
    }

    #[test]
    fn test_invalid_language_is_error() {
        assert!(Config::parse("language = \"klingon\"\n").is_err());
    }

    #[test]
    fn test_storage_path_override() {
        let config = Config::parse("[storage]\npath = \"/tmp/desk.json\"\n").unwrap();
        assert_eq!(config.storage_path().unwrap(), PathBuf::from("/tmp/desk.json"));
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let mut config = Config::default();
        config.language = Language::En;
        config.timer.duration_minutes = 45;
        let text = toml::to_string_pretty(&config).unwrap();
        let back = Config::parse(&text).unwrap();
        assert_eq!(back.language, Language::En);
        assert_eq!(back.timer.duration_minutes, 45);
    }
}
