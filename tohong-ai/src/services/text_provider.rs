//! Text-generation provider seam
//!
//! The compatibility service talks to exactly one external collaborator: a
//! model that takes a system instruction plus a user prompt and returns one
//! blob of text. No streaming, no multi-turn state.

use async_trait::async_trait;
use thiserror::Error;

/// Text provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider API error {0}: {1}")]
    Api(u16, String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Malformed provider envelope: {0}")]
    Envelope(String),

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Provider call cancelled")]
    Cancelled,
}

/// One prompt sent to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRequest {
    pub system_instruction: String,
    pub prompt: String,
}

/// External text-generation collaborator
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Send one prompt and return the raw reply text
    ///
    /// # Errors
    /// Returns `ProviderError` for transport, HTTP, or envelope failures.
    async fn generate(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}
