//! Per-request provider credential

use std::fmt;

/// Provider API key supplied with a request; never stored or logged in full
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the Authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True if the key is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether the key has the usual `sk-` prefix
    pub fn looks_like_openai_key(&self) -> bool {
        self.0.starts_with("sk-")
    }

    /// First five characters, safe to log
    pub fn preview(&self) -> String {
        self.0.chars().take(5).collect()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({}...)", self.preview())
    }
}
