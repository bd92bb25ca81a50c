//! Configuration for the RAG backend

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Upload storage configuration
    pub storage: StorageConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding/chat provider configuration
    pub openai: OpenAiConfig,
    /// Vector collection configuration
    pub vector_db: VectorDbConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides.
    ///
    /// A missing `path` means defaults. Recognised variables: `RAG_HOST`, `RAG_PORT`,
    /// `RAG_UPLOAD_DIR`, `RAG_VECTOR_DB_PATH`, `OPENAI_BASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse TOML text
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RAG_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RAG_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("RAG_PORT is not a valid port: {}", port)))?;
        }
        if let Some(dir) = lookup("RAG_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("RAG_VECTOR_DB_PATH") {
            self.vector_db.storage_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".to_string()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be positive".to_string()));
        }
        let name = &self.vector_db.collection;
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::Config(format!(
                "vector_db.collection must match [A-Za-z0-9_]+, got '{}'",
                name
            )));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes (default: 50MB)
    pub max_upload_size: usize,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_upload_size: 50 * 1024 * 1024,
            allowed_origins: vec![
                "http://localhost:5173".to_string(), // Vite dev server
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

/// Where uploads are written while being processed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Upload directory; files are deleted once their request completes
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploaded_files"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 150,
        }
    }
}

/// OpenAI-compatible provider configuration
///
/// The API key is deliberately absent: it arrives with each request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Chat model name
    pub chat_model: String,
    /// Temperature for chat completions
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.2, // Low for answers that stay close to the excerpts
            timeout_secs: 60,
        }
    }
}

/// Vector collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// SQLite file holding the collection
    pub storage_path: PathBuf,
    /// Collection name
    pub collection: String,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("chroma_db").join("collection.sqlite3"),
            collection: "document_embeddings".to_string(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the chat model
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}
