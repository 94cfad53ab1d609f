//! Retry utilities for transient model failures.
//!
//! Provides classification of retryable errors, exponential backoff, and the
//! timeout-plus-retry loop every scan goes through.

use super::provider::{VisionProvider, VisionRequest, VisionResponse};
use crate::error::PipelineError;
use std::path::Path;
use std::time::Duration;

/// Timeout and retry policy for a single model call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Per-attempt timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first attempt
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Determine whether a pipeline error is worth retrying.
///
/// Retryable errors: timeouts, unreachable endpoints, rate limits (429),
/// server errors (5xx). Non-retryable: auth failures, bad requests, blocked
/// prompts, unparsable replies.
pub fn is_retryable(error: &PipelineError) -> bool {
    match error {
        PipelineError::Timeout { .. } | PipelineError::Connection(_) => true,
        PipelineError::Llm {
            status_code: Some(code),
            ..
        } => *code == 429 || (500..=599).contains(code),
        _ => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// Call the provider under a timeout, retrying transient failures.
///
/// `path` only labels timeout errors and log lines.
pub async fn ask(
    provider: &dyn VisionProvider,
    request: &VisionRequest,
    policy: &RetryPolicy,
    path: &Path,
) -> Result<VisionResponse, PipelineError> {
    let mut last_error = None;

    for attempt in 0..=policy.retry_attempts {
        if attempt > 0 {
            let delay = backoff_duration(attempt - 1, policy.retry_delay_ms);
            tracing::debug!(
                "Retry {attempt}/{} for {:?} after {delay:?}",
                policy.retry_attempts,
                path
            );
            tokio::time::sleep(delay).await;
        }

        let err = match tokio::time::timeout(
            Duration::from_millis(policy.timeout_ms),
            provider.generate(request),
        )
        .await
        {
            Ok(Ok(response)) => {
                tracing::debug!(
                    provider = provider.name(),
                    model = %response.model,
                    latency_ms = response.latency_ms,
                    "Model replied for {:?}",
                    path
                );
                return Ok(response);
            }
            Ok(Err(e)) => e,
            Err(_) => PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "llm".to_string(),
                timeout_ms: policy.timeout_ms,
            },
        };

        let retryable = is_retryable(&err);
        tracing::warn!("{} call failed for {:?}: {err}", provider.name(), path);
        last_error = Some(err);
        if !retryable {
            break;
        }
    }

    Err(last_error.unwrap_or_else(|| PipelineError::llm("no attempts made")))
}
