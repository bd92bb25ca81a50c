//! HTTP server for the RAG backend

pub mod auth;
pub mod routes;
pub mod state;

use axum::{http::HeaderValue, routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use state::AppState;

/// RAG HTTP Server
pub struct RagServer {
    config: RagConfig,
    state: AppState,
}

impl RagServer {
    /// Create a new RAG server
    pub async fn new(config: RagConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Create a server around prepared state
    pub fn with_state(config: RagConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn router(state: AppState) -> Router {
        let cors = cors_layer(&state.config().server.allowed_origins);
        let max_upload_size = state.config().server.max_upload_size;

        Router::new()
            .route("/health", get(health_check))
            .merge(routes::api_routes(max_upload_size))
            .with_state(state)
            // Middleware layers (order matters - applied bottom to top)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Start the server; returns after Ctrl+C once the collection is closed
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = Self::router(self.state.clone());

        tracing::info!("Starting RAG server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))?;

        tracing::info!("Shutting down, closing vector store");
        self.state.vector_store().close().await?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
