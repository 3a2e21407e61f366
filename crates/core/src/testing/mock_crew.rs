//! Scripted crew for queue and pipeline tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::{Mutex, RwLock, Semaphore};

use crate::crew::{Crew, CrewError, CrewOutput, CrewRequest};
use crate::job::{JobProgress, Stage};

enum Scripted {
    Output(CrewOutput),
    Error(CrewError),
    Panic(String),
}

/// Mock implementation of the [`Crew`] trait.
///
/// Each kickoff pops the next scripted outcome; with nothing scripted it
/// returns a complete structured output that mentions both hosts. A gated
/// crew holds every kickoff until [`MockCrew::release`] hands out a permit.
pub struct MockCrew {
    scripted: Arc<Mutex<VecDeque<Scripted>>>,
    calls: Arc<RwLock<Vec<CrewRequest>>>,
    gate: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for MockCrew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCrew")
            .field("gated", &self.gate.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for MockCrew {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCrew {
    pub fn new() -> Self {
        Self {
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            gate: None,
        }
    }

    /// A crew whose runs block until released.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    /// Let `runs` blocked or future kickoffs proceed.
    pub fn release(&self, runs: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(runs);
        }
    }

    pub async fn push_output(&self, output: CrewOutput) {
        self.scripted.lock().await.push_back(Scripted::Output(output));
    }

    pub async fn push_error(&self, error: CrewError) {
        self.scripted.lock().await.push_back(Scripted::Error(error));
    }

    /// Make a future kickoff panic with `message`.
    pub async fn push_panic(&self, message: impl Into<String>) {
        self.scripted
            .lock()
            .await
            .push_back(Scripted::Panic(message.into()));
    }

    /// Requests seen so far, in call order.
    pub async fn calls(&self) -> Vec<CrewRequest> {
        self.calls.read().await.clone()
    }

    /// Complete output for `request`, the way a healthy crew would answer.
    pub fn default_output(request: &CrewRequest) -> CrewOutput {
        let [a, b] = &request.hosts;
        let value = json!({
            "research_task": format!("Recherche sur {}: faits et tendances.", request.topic),
            "topic_curation_task": format!("Trois angles sur {}.", request.topic),
            "script_writing_task": format!(
                "# {topic}\n\n{a}: Bienvenue! Aujourd'hui on parle de {topic}.\n{b}: Ben oui, c'est un sujet qui fait jaser.\n{a}: Merci de nous avoir écoutés!",
                topic = request.topic
            ),
            "audio_production_task": {
                "profils_voix": { a.as_str(): "chaleureux", b.as_str(): "dynamique" },
                "rythme": "modéré"
            }
        });
        CrewOutput::from_value(value)
    }
}

#[async_trait]
impl Crew for MockCrew {
    async fn kickoff(
        &self,
        request: &CrewRequest,
        progress: &JobProgress,
    ) -> Result<CrewOutput, CrewError> {
        self.calls.write().await.push(request.clone());

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        progress.stage(Stage::Summarize.as_str(), "Summarizing research");
        progress.stage(Stage::Script.as_str(), "Writing script");
        progress.stage(Stage::Voice.as_str(), "Preparing voices");

        let next = self.scripted.lock().await.pop_front();
        match next {
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::Error(error)) => Err(error),
            Some(Scripted::Panic(message)) => panic!("{}", message),
            None => Ok(Self::default_output(request)),
        }
    }
}
