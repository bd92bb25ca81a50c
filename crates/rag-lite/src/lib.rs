//! rag-lite: minimal retrieval-augmented generation backend
//!
//! Documents are parsed, split into overlapping chunks, embedded through an
//! OpenAI-compatible API and stored in a persistent SQLite-backed collection.
//! Queries are embedded the same way, matched against the collection, and the
//! nearest chunks are handed to a chat model as grounding context.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ChunkMetadata, FileType},
    query::ChatQuery,
    response::{ChatResponse, UploadResponse},
};
