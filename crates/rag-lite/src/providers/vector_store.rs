//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChunkMetadata;

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `LocalVectorStore`: SQLite collection on local disk
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Upsert one record per index of the parallel lists; returns records written
    async fn add(
        &self,
        texts: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<ChunkMetadata>,
    ) -> Result<usize>;

    /// Texts of the `top_k` nearest records, nearest first
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<String>>;

    /// Drop every record and leave the collection ready for new adds
    async fn clear(&self) -> Result<()>;

    /// Get total number of vectors stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Release the underlying storage
    async fn close(&self) -> Result<()>;

    /// Collection name
    fn collection(&self) -> &str;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
