//! Web search abstraction.
//!
//! Searches never fail from the caller's point of view: when no API key is
//! configured or the provider misbehaves, deterministic simulated results are
//! returned instead.

mod serper;
mod simulated;

pub use serper::SerperSearch;
pub use simulated::simulated_results;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Date the hit was retrieved, `YYYY-MM-DD`.
    pub date: String,
}

/// Provider failures. Only visible inside the provider; callers get simulated
/// results instead.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Up to `num_results` hits for `query`, in provider order.
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit>;
}
