//! Core types for the RAG backend

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, ChunkMetadata, FileType};
pub use query::ChatQuery;
pub use response::{ChatResponse, MessageResponse, StatsResponse, UploadResponse};
