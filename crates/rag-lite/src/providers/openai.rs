//! OpenAI-compatible client for embeddings and chat completions
//!
//! One `reqwest::Client` serves both endpoints. The API key is not part of
//! the client; it is passed per call and sent as a bearer token.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;

use super::api_key::ApiKey;
use super::embedding::EmbeddingProvider;
use super::llm::ChatProvider;

/// Client for an OpenAI-compatible REST API
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    embed_model: String,
    chat_model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("rag-lite/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embed_model.clone(),
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req, api_key: &ApiKey) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(api_key.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Failed to parse {} response: {}", path, e)))
    }
}

fn require_key(api_key: &ApiKey) -> Result<()> {
    if api_key.is_blank() {
        return Err(Error::MissingApiKey(
            "an OpenAI API key must be supplied with the request".to_string(),
        ));
    }
    Ok(())
}

/// Map a non-success upstream response onto an error kind
pub fn classify_failure(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                format!("{}: {}", status, body.trim())
            }
        });

    match status {
        StatusCode::UNAUTHORIZED => Error::UpstreamAuth(message),
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited(message),
        _ => Error::Upstream(message),
    }
}

/// Restore input order and check that every input got a vector of one width
fn order_embeddings(mut data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(Error::upstream(format!(
            "Expected {} embeddings, received {}",
            expected,
            data.len()
        )));
    }

    data.sort_by_key(|d| d.index);
    if data.iter().enumerate().any(|(i, d)| d.index != i) {
        return Err(Error::upstream("Embedding response indices are not contiguous"));
    }

    let dimension = data.first().map(|d| d.embedding.len()).unwrap_or(0);
    if dimension == 0 || data.iter().any(|d| d.embedding.len() != dimension) {
        return Err(Error::upstream("Embedding response has inconsistent dimensions"));
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed_batch(&self, texts: &[String], api_key: &ApiKey) -> Result<Vec<Vec<f32>>> {
        require_key(api_key)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(model = %self.embed_model, count = texts.len(), "Requesting embeddings");

        let request = EmbeddingRequest {
            model: &self.embed_model,
            input: texts,
        };
        let response: EmbeddingResponse = self.post_json("embeddings", &request, api_key).await?;

        order_embeddings(response.data, texts.len())
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn complete(&self, query: &str, contexts: &[String], api_key: &ApiKey) -> Result<String> {
        require_key(api_key)?;

        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(PromptBuilder::system_prompt()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(PromptBuilder::build_user_prompt(query, contexts)),
                },
            ],
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.chat_model, contexts = contexts.len(), "Requesting chat completion");

        let completion: ChatCompletion = self
            .post_json("chat/completions", &request, api_key)
            .await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::upstream("Chat completion contained no answer"))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.chat_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(index: usize, embedding: Vec<f32>) -> EmbeddingData {
        EmbeddingData { index, embedding }
    }

    #[test]
    fn test_classify_failure() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        match classify_failure(StatusCode::UNAUTHORIZED, body) {
            Error::UpstreamAuth(msg) => assert_eq!(msg, "Incorrect API key provided"),
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "nope"),
            Error::Upstream(_)
        ));
        match classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "plain text") {
            Error::Upstream(msg) => assert!(msg.contains("plain text")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_order_embeddings() {
        let ordered = order_embeddings(
            vec![data(1, vec![2.0, 2.0]), data(0, vec![1.0, 1.0])],
            2,
        )
        .unwrap();
        assert_eq!(ordered, vec![vec![1.0, 1.0], vec![2.0, 2.0]]);

        assert!(order_embeddings(vec![data(0, vec![1.0])], 2).is_err());
        assert!(order_embeddings(vec![data(0, vec![1.0]), data(1, vec![1.0, 2.0])], 2).is_err());
        assert!(order_embeddings(vec![data(0, vec![1.0]), data(0, vec![1.0])], 2).is_err());
    }

    #[tokio::test]
    async fn test_missing_key_checked_first() {
        let client = OpenAiClient::new(&OpenAiConfig::default()).unwrap();
        let blank = ApiKey::new("");

        let err = client.embed_batch(&[], &blank).await.unwrap_err();
        assert!(matches!(err, Error::MissingApiKey(_)));

        let err = client.complete("q", &[], &blank).await.unwrap_err();
        assert!(matches!(err, Error::MissingApiKey(_)));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let config = OpenAiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..OpenAiConfig::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        let vectors = client.embed_batch(&[], &ApiKey::new("sk-test")).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream_error() {
        let config = OpenAiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..OpenAiConfig::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        let err = client
            .embed_batch(&["hello".to_string()], &ApiKey::new("sk-test"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
