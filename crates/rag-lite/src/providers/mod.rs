//! Provider abstractions for embeddings, chat, and vector storage
//!
//! Handlers only see the traits; the server wires in the OpenAI-compatible
//! client and the local SQLite collection, tests wire in fakes.

pub mod api_key;
pub mod embedding;
pub mod llm;
pub mod local;
pub mod openai;
pub mod vector_store;

pub use api_key::ApiKey;
pub use embedding::EmbeddingProvider;
pub use llm::ChatProvider;
pub use local::LocalVectorStore;
pub use openai::OpenAiClient;
pub use vector_store::VectorStoreProvider;
