//! Request body types

use serde::{Deserialize, Serialize};

/// Body of `POST /chat/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQuery {
    /// The user's question
    pub query: String,
}
