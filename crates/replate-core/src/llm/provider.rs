//! Vision provider trait and request/response types.
//!
//! Defines the interface every hosted model backend implements, plus the
//! factory that builds the right provider from CLI flags and config.

use crate::config::LlmConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use base64::Engine;

/// Base64-encoded image ready to send to a model API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and a format identifier
    /// ("jpeg", "png", "webp", ...).
    pub fn from_bytes(bytes: &[u8], format: &str) -> Self {
        let media_type = match format {
            "jpeg" | "jpg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "bmp" => "image/bmp",
            other => {
                tracing::warn!("Unknown image format '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }
}

/// A single image + prompt request.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// The image to analyze
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl VisionRequest {
    /// Build a request with the defaults used for extraction prompts.
    ///
    /// Replies are short and should be as deterministic as the model allows.
    pub fn new(image: ImageInput, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
            max_tokens: 512,
            temperature: 0.0,
        }
    }
}

/// The free-text reply from a vision model call.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all hosted vision backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Send the image and prompt, returning the model's text reply.
    ///
    /// No timeout is applied here; `retry::ask` bounds each attempt.
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, PipelineError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that creates the appropriate provider from CLI flags and config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a vision provider.
    ///
    /// # Arguments
    /// * `provider` - Provider identifier (currently only "gemini")
    /// * `config` - The full LLM config section
    /// * `model_override` - Optional model name that overrides the config default
    /// * `api_key_override` - Optional key that takes precedence over the config value
    pub fn create(
        provider: &str,
        config: &LlmConfig,
        model_override: Option<&str>,
        api_key_override: Option<&str>,
    ) -> Result<Box<dyn VisionProvider>, PipelineError> {
        match provider {
            "gemini" => {
                let cfg = &config.gemini;
                let api_key = api_key_override
                    .map(String::from)
                    .or_else(|| resolve_env_var(&cfg.api_key))
                    .ok_or_else(|| {
                        PipelineError::llm(
                            "Gemini API key not set. Set GOOGLE_API_KEY in .env or the environment.",
                        )
                    })?;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    model,
                )))
            }
            other => Err(PipelineError::llm(format!(
                "Unknown vision provider: {other}"
            ))),
        }
    }
}
