//! Local vector store provider over the SQLite collection
//!
//! The collection is synchronous; every call runs on the blocking pool so
//! index I/O never stalls the async workers.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::retrieval::VectorStore;
use crate::types::ChunkMetadata;

use super::vector_store::VectorStoreProvider;

/// Local vector store wrapping [`VectorStore`]
pub struct LocalVectorStore {
    store: Arc<VectorStore>,
}

impl LocalVectorStore {
    /// Create from existing VectorStore
    pub fn new(store: Arc<VectorStore>) -> Self {
        Self { store }
    }

    /// Open the configured collection
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let store = VectorStore::open(&config.vector_db.storage_path, &config.vector_db.collection)?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Get underlying store for direct access
    pub fn inner(&self) -> &Arc<VectorStore> {
        &self.store
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&VectorStore) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn add(
        &self,
        texts: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        metadatas: Vec<ChunkMetadata>,
    ) -> Result<usize> {
        self.run(move |store| store.add(&texts, &embeddings, &metadatas))
            .await
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<String>> {
        let query = query_embedding.to_vec();
        self.run(move |store| store.search(&query, top_k)).await
    }

    async fn clear(&self) -> Result<()> {
        self.run(|store| store.clear()).await
    }

    async fn len(&self) -> Result<usize> {
        self.run(|store| store.count()).await
    }

    async fn close(&self) -> Result<()> {
        self.run(|store| store.close()).await
    }

    fn collection(&self) -> &str {
        self.store.collection_name()
    }

    fn name(&self) -> &str {
        "local-sqlite"
    }
}
