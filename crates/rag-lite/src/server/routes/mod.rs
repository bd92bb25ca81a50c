//! API routes for the RAG server

pub mod chat;
pub mod clear;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Ingestion - with larger body limit for file uploads
        .route(
            "/upload/",
            post(upload::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/chat/", post(chat::chat))
        .route("/clear/", post(clear::clear_collection))
        .route("/stats", get(clear::stats))
}
