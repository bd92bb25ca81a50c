//! Collection maintenance endpoints

use axum::{extract::State, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{MessageResponse, StatsResponse};

/// POST /clear/ - Remove every stored record
pub async fn clear_collection(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    let store = state.vector_store();
    store.clear().await?;
    tracing::info!("Cleared collection '{}'", store.collection());

    Ok(Json(MessageResponse {
        message: "Vector store collection cleared successfully.".to_string(),
    }))
}

/// GET /stats - Collection name and record count
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let store = state.vector_store();
    Ok(Json(StatsResponse {
        collection: store.collection().to_string(),
        count: store.len().await?,
    }))
}
