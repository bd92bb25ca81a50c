//! Response body types

use serde::{Deserialize, Serialize};

/// Result of `POST /upload/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Uploaded filename
    pub filename: String,
    /// Human-readable status
    pub message: String,
    /// Chunks produced from the document
    pub chunk_count: usize,
    /// Vectors written to the collection
    pub vector_count: usize,
}

/// Result of `POST /chat/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Answer text
    pub response: String,
}

/// Generic acknowledgement, used by `POST /clear/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable status
    pub message: String,
}

/// Result of `GET /stats`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Collection name
    pub collection: String,
    /// Stored record count
    pub count: usize,
}
