//! Error types for the Re-plate scanning pipeline.
//!
//! Errors are organized by stage so messages carry the file path and the
//! stage that failed. A model reply without a usable date is not an error;
//! it surfaces as an empty report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Re-plate operations.
#[derive(Error, Debug)]
pub enum ReplateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scan pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Scan pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Image could not be read or re-encoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The hosted model call failed
    #[error("Vision model error: {message}")]
    Llm {
        message: String,
        status_code: Option<u16>,
    },

    /// The model endpoint could not be reached (refused, DNS, dropped socket)
    #[error("Vision model unreachable: {0}")]
    Connection(String),

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
}

impl PipelineError {
    /// Shorthand for a model error without an HTTP status.
    pub(crate) fn llm(message: impl Into<String>) -> Self {
        Self::Llm {
            message: message.into(),
            status_code: None,
        }
    }

    /// Classify a failed `send()`. Connect and transport timeouts become
    /// `Connection`; anything else (bad URL, body encoding) stays `Llm`.
    pub(crate) fn from_send(provider: &str, e: reqwest::Error) -> Self {
        let message = format!("{provider} request failed: {e}");
        if e.is_connect() || e.is_timeout() {
            Self::Connection(message)
        } else {
            Self::llm(message)
        }
    }
}

/// Convenience type alias for Re-plate results.
pub type Result<T> = std::result::Result<T, ReplateError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
