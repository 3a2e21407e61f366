//! Scripted LLM client.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// Mock implementation of [`LlmClient`].
///
/// Pops scripted responses in order; once they run out every completion
/// answers `"Réponse N"` where N counts calls from 1.
pub struct MockLlm {
    responses: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    requests: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl std::fmt::Debug for MockLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlm").finish_non_exhaustive()
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn push_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(text.into()));
    }

    pub async fn push_error(&self, error: LlmError) {
        self.responses.lock().await.push_back(Err(error));
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let call = {
            let mut requests = self.requests.write().await;
            requests.push(request.clone());
            requests.len()
        };

        let text = match self.responses.lock().await.pop_front() {
            Some(scripted) => scripted?,
            None => format!("Réponse {}", call),
        };

        Ok(CompletionResponse {
            usage: LlmUsage {
                input_tokens: request.prompt.len() as u32 / 4,
                output_tokens: text.len() as u32 / 4,
            },
            model: "mock-model".to_string(),
            text,
        })
    }
}
