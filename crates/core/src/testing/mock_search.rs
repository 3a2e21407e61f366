//! Web search double backed by the canned result sets.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::clock::FixedClock;
use crate::search::{simulated_results, SearchHit, WebSearch};

/// Mock implementation of [`WebSearch`].
///
/// Answers from the simulated result sets for a fixed date, or from hits set
/// with [`MockSearch::set_results`]. Records `(query, num_results)` pairs.
pub struct MockSearch {
    results: Arc<RwLock<Option<Vec<SearchHit>>>>,
    queries: Arc<RwLock<Vec<(String, usize)>>>,
    clock: FixedClock,
}

impl std::fmt::Debug for MockSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearch").finish_non_exhaustive()
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearch {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(None)),
            queries: Arc::new(RwLock::new(Vec::new())),
            clock: FixedClock(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    pub async fn set_results(&self, hits: Vec<SearchHit>) {
        *self.results.write().await = Some(hits);
    }

    pub async fn queries(&self) -> Vec<(String, usize)> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        self.queries
            .write()
            .await
            .push((query.to_string(), num_results));

        match self.results.read().await.as_ref() {
            Some(hits) => hits.iter().take(num_results).cloned().collect(),
            None => simulated_results(query, num_results, &self.clock),
        }
    }
}
