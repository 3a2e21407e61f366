use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{simulated_results, SearchError, SearchHit, WebSearch};
use crate::clock::Clock;
use crate::config::SearchConfig;
use crate::metrics::PROVIDER_DEGRADED;

/// Serper.dev Google search client.
pub struct SerperSearch {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperSearch {
    pub fn new(config: &SearchConfig, clock: Arc<dyn Clock>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            api_url: config.api_url.clone(),
            clock,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn query(
        &self,
        api_key: &str,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("X-API-KEY", api_key)
            .json(&SerperRequest {
                q: query,
                num: num_results,
            })
            .send()
            .await
            .map_err(|e| SearchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Json(e.to_string()))?;

        // Serper does not reliably return dates.
        let today = self.clock.today();
        Ok(body
            .organic
            .into_iter()
            .take(num_results)
            .map(|item| SearchHit {
                title: item.title,
                url: item.link,
                snippet: item.snippet,
                date: today.clone(),
            })
            .collect())
    }

    fn degrade(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        PROVIDER_DEGRADED.with_label_values(&["serper"]).inc();
        simulated_results(query, num_results, self.clock.as_ref())
    }
}

#[async_trait]
impl WebSearch for SerperSearch {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchHit> {
        let Some(api_key) = &self.api_key else {
            debug!(query, "No Serper API key, using simulated results");
            return self.degrade(query, num_results);
        };

        match self.query(api_key, query, num_results).await {
            Ok(hits) => {
                debug!(query, count = hits.len(), "Serper search complete");
                hits
            }
            Err(e) => {
                warn!(query, error = %e, "Serper search failed, using simulated results");
                self.degrade(query, num_results)
            }
        }
    }
}
