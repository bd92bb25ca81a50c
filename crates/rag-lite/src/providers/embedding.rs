//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use super::api_key::ApiKey;
use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OpenAiClient`: OpenAI-compatible `/embeddings` endpoint
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `texts`, returning one vector per input in input order.
    ///
    /// A blank `api_key` fails with [`Error::MissingApiKey`] before anything
    /// else; an empty `texts` returns an empty result without a remote call.
    async fn embed_batch(&self, texts: &[String], api_key: &ApiKey) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed(&self, text: &str, api_key: &ApiKey) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()], api_key)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream("Embedding response contained no vector"))
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
