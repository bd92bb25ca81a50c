//! Error types for the RAG backend

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG backend errors
///
/// Both provider clients report failures through this type, so handlers
/// dispatch on the variant instead of inspecting returned text.
#[derive(Debug, Error)]
pub enum Error {
    /// No provider credential was supplied
    #[error("API key is required: {0}")]
    MissingApiKey(String),

    /// Malformed request (missing field, blank query, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Parsing or chunking produced no usable text
    #[error("{0}")]
    EmptyDocument(String),

    /// A file expected on disk is missing
    #[error("File not found: {0}")]
    NotFound(String),

    /// Chunk and embedding counts disagree
    #[error("Mismatch in generated embeddings count: {chunks} chunks, {embeddings} embeddings")]
    CountMismatch { chunks: usize, embeddings: usize },

    /// Upstream provider rejected the credential
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    /// Upstream provider throttled the request
    #[error("Upstream rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other upstream provider failure
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// Arguments rejected by the vector store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Vector store error
    #[error("Vector store error: {0}")]
    VectorDb(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an upstream error
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    /// Create a vector store error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// HTTP status and machine-readable type for this error
    pub fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Error::MissingApiKey(_) => (StatusCode::UNAUTHORIZED, "missing_api_key"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::UnsupportedFileType(_) => (StatusCode::BAD_REQUEST, "unsupported_type"),
            Error::EmptyDocument(_) => (StatusCode::UNPROCESSABLE_ENTITY, "empty_document"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::CountMismatch { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "count_mismatch"),
            Error::UpstreamAuth(_) => (StatusCode::UNAUTHORIZED, "upstream_auth_error"),
            Error::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            Error::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            Error::InvalidInput(_) => (StatusCode::INTERNAL_SERVER_ERROR, "invalid_input"),
            Error::VectorDb(_) => (StatusCode::INTERNAL_SERVER_ERROR, "vector_db_error"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::VectorDb(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error_type, "Request failed: {:?}", self);
        } else {
            tracing::warn!(error_type, "Request rejected: {}", message);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
