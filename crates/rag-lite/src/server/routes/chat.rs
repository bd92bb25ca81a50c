//! Grounded chat endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::providers::ApiKey;
use crate::server::state::AppState;
use crate::types::{ChatQuery, ChatResponse};

/// POST /chat/ - Answer a question from the stored documents
pub async fn chat(
    State(state): State<AppState>,
    api_key: ApiKey,
    Json(request): Json<ChatQuery>,
) -> Result<Json<ChatResponse>> {
    let start = Instant::now();
    let query = request.query.trim();
    if query.is_empty() {
        return Err(Error::InvalidRequest("Query must not be empty".to_string()));
    }

    tracing::info!("Chat query: \"{}\"", query);

    let query_embedding = state.embedder().embed(query, &api_key).await?;

    let top_k = state.config().retrieval.top_k;
    let contexts = state.vector_store().search(&query_embedding, top_k).await?;
    if contexts.is_empty() {
        tracing::info!("No relevant chunks found; asking model without context");
    } else {
        tracing::debug!("Retrieved {} chunks", contexts.len());
    }

    let response = state.llm().complete(query, &contexts, &api_key).await?;

    tracing::info!(
        "Answered with {} ({}ms)",
        state.llm().model(),
        start.elapsed().as_millis()
    );

    Ok(Json(ChatResponse { response }))
}
