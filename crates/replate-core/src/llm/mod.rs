//! Hosted vision model access.
//!
//! Provides a provider abstraction (Gemini is the only backend today) and the
//! timeout/retry loop around each call.

pub(crate) mod gemini;
pub mod provider;
pub mod retry;

pub use provider::{ImageInput, ProviderFactory, VisionProvider, VisionRequest, VisionResponse};
pub use retry::{ask, RetryPolicy};
