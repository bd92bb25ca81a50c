//! RAG Server binary
//!
//! Run with: cargo run -p rag-lite --bin rag-lite-server -- --config rag.toml

use clap::Parser;
use std::path::PathBuf;

use rag_lite::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Minimal RAG backend: upload documents, ask questions about them
#[derive(Debug, Parser)]
#[command(name = "rag-lite-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_lite=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = RagConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.openai.embed_model);
    tracing::info!("  - Chat model: {}", config.openai.chat_model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );
    tracing::info!("  - Upload directory: {}", config.storage.upload_dir.display());

    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload/ - Upload a .txt, .md or .pdf document");
    println!("  POST /chat/   - Ask a question");
    println!("  POST /clear/  - Remove all stored documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
