//! `X-API-Key` request header extraction

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::Error;
use crate::providers::ApiKey;

/// Header carrying the caller's provider key
pub const API_KEY_HEADER: &str = "x-api-key";

#[async_trait]
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(API_KEY_HEADER)
            .ok_or_else(|| Error::MissingApiKey("X-API-Key header is missing".to_string()))?;

        let key = value
            .to_str()
            .map_err(|_| Error::InvalidRequest("X-API-Key header is not valid ASCII".to_string()))?;

        let key = ApiKey::new(key.trim());
        if key.is_blank() {
            return Err(Error::MissingApiKey("X-API-Key header is empty".to_string()));
        }

        if !key.looks_like_openai_key() {
            tracing::warn!(
                "API key does not look like an OpenAI key (starts with '{}')",
                key.preview()
            );
        }

        Ok(key)
    }
}
