//! Configuration management for Re-plate.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a missing file or a
//! partial file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Re-plate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input discovery settings
    pub processing: ProcessingConfig,

    /// Retry policy for model calls
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Expiry bucketing settings
    pub expiry: ExpiryConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Vision model provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/org.replate.replate/config.toml
    /// - Linux: ~/.config/replate/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\replate\replate\config\config.toml
    ///
    /// Falls back to ~/.replate/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("org", "replate", "replate")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".replate").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.parallel_workers, 4);
        assert_eq!(config.expiry.critical_window_days, 5);
        assert_eq!(config.limits.max_file_size_mb, 20);
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[expiry]"));
        assert!(toml.contains("[llm.gemini]"));
        assert!(toml.contains("${GOOGLE_API_KEY}"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [expiry]
            critical_window_days = 7

            [llm.gemini]
            model = "gemini-2.5-flash"
            "#,
        )
        .unwrap();
        assert_eq!(config.expiry.critical_window_days, 7);
        assert_eq!(config.llm.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.pipeline.retry_attempts, 3);
        assert_eq!(config.llm.provider, "gemini");
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, Config::default().to_toml().unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.limits.max_upload_dimension, 3072);
        assert_eq!(
            loaded.llm.gemini.endpoint,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml("[expiry\ncritical_window_days = 5").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
