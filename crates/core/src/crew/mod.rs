//! Adapter boundary to the multi-agent pipeline.
//!
//! A [`Crew`] runs the research, curation, script and audio-direction steps
//! for one job and hands back a [`CrewOutput`]. The output is a tagged union so
//! callers match on its shape instead of inspecting values at runtime.

mod agents;
mod personas;

pub use agents::{AgentCrew, CrewSettings};
pub use personas::AgentPersona;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::job::{Hosts, JobProgress};
use crate::llm::LlmError;
use crate::tts::TtsError;

/// Fixed inputs for one crew run.
#[derive(Debug, Clone, PartialEq)]
pub struct CrewRequest {
    pub job_id: String,
    pub topic: String,
    pub hosts: Hosts,
    /// Year given to the agents as "current" context.
    pub year: i32,
}

/// What a crew run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CrewOutput {
    /// Per-task outputs keyed by task name.
    Structured(Map<String, Value>),
    /// A single block of free text.
    Text(String),
    /// Nothing usable.
    Empty,
}

impl CrewOutput {
    /// Classify an arbitrary JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => CrewOutput::Empty,
            Value::Object(map) => CrewOutput::Structured(map),
            Value::String(text) => CrewOutput::Text(text),
            other => CrewOutput::Text(other.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CrewOutput::Structured(_) => "structured",
            CrewOutput::Text(_) => "text",
            CrewOutput::Empty => "empty",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    #[error("{agent} failed: {source}")]
    Agent {
        agent: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("Audio rendering failed: {0}")]
    Audio(#[from] TtsError),

    #[error("Crew unavailable: {0}")]
    Unavailable(String),
}

/// Runs the four-step podcast pipeline.
#[async_trait]
pub trait Crew: Send + Sync {
    async fn kickoff(
        &self,
        request: &CrewRequest,
        progress: &JobProgress,
    ) -> Result<CrewOutput, CrewError>;
}
