//! Chat provider trait for generating answers

use async_trait::async_trait;

use super::api_key::ApiKey;
use crate::error::Result;

/// Trait for grounded answer generation
///
/// Implementations:
/// - `OpenAiClient`: OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Answer `query` using only `contexts` as source material.
    ///
    /// Failures are reported through the error type, never as answer text.
    async fn complete(&self, query: &str, contexts: &[String], api_key: &ApiKey) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
