//! Application state for the RAG server

use std::path::Path;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::ingestion::TextChunker;
use crate::providers::{
    ChatProvider, EmbeddingProvider, LocalVectorStore, OpenAiClient, VectorStoreProvider,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Persistent collection
    vector_store: Arc<dyn VectorStoreProvider>,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// Chat provider
    llm: Arc<dyn ChatProvider>,
    /// Chunker built from `config.chunking`
    chunker: TextChunker,
}

impl AppState {
    /// Create application state with the local collection and the OpenAI-compatible client
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");

        let vector_store = Arc::new(LocalVectorStore::from_config(&config)?);
        tracing::info!(
            "Vector store '{}' opened at {}",
            vector_store.collection(),
            config.vector_db.storage_path.display()
        );

        let client = Arc::new(OpenAiClient::new(&config.openai)?);
        tracing::info!(
            "OpenAI client initialized (embeddings: {}, chat: {})",
            config.openai.embed_model,
            config.openai.chat_model
        );

        let state = Self::with_providers(config, vector_store, client.clone(), client)?;
        let count = state.vector_store().len().await?;
        tracing::info!("Collection contains {} records", count);

        Ok(state)
    }

    /// Create application state from explicit providers
    pub fn with_providers(
        config: RagConfig,
        vector_store: Arc<dyn VectorStoreProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn ChatProvider>,
    ) -> Result<Self> {
        ensure_dir(&config.storage.upload_dir)?;
        let chunker = TextChunker::from_config(&config.chunking);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                vector_store,
                embedder,
                llm,
                chunker,
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the vector store
    pub fn vector_store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.inner.vector_store
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedder
    }

    /// Get the chat provider
    pub fn llm(&self) -> &Arc<dyn ChatProvider> {
        &self.inner.llm
    }

    /// Get the chunker
    pub fn chunker(&self) -> &TextChunker {
        &self.inner.chunker
    }

    /// Directory uploads are written to
    pub fn upload_dir(&self) -> &Path {
        &self.inner.config.storage.upload_dir
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::Config(format!(
            "Failed to create upload directory {}: {}",
            dir.display(),
            e
        ))
    })
}
