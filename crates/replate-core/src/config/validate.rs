//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::{Config, PROVIDERS};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_upload_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_upload_dimension must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.expiry.critical_window_days > 365 {
            return Err(ConfigError::ValidationError(
                "expiry.critical_window_days must be <= 365".into(),
            ));
        }
        if !PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "llm.provider must be one of {}, got '{}'",
                PROVIDERS.join(", "),
                self.llm.provider
            )));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be json or jsonl, got '{}'",
                self.output.format
            )));
        }
        Ok(())
    }
}
