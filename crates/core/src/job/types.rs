//! Job record and its lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::config::PodcastConfig;

/// The two hosts of an episode, in speaking order.
pub type Hosts = [String; 2];

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Named phase of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Research,
    Summarize,
    Script,
    Voice,
    Complete,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; 5] = [
        Stage::Research,
        Stage::Summarize,
        Stage::Script,
        Stage::Voice,
        Stage::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::Summarize => "summarize",
            Stage::Script => "script",
            Stage::Voice => "voice",
            Stage::Complete => "complete",
        }
    }

    /// Recognize a stage tag. Free-form tags (e.g. "debug") yield `None`.
    pub fn parse(tag: &str) -> Option<Stage> {
        Stage::ALL.into_iter().find(|s| s.as_str() == tag)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Progress percentage reached when this stage begins.
    pub fn progress(&self) -> u8 {
        (100 * self.index() / Stage::ALL.len()) as u8
    }
}

/// One entry of a job's append-only update log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobUpdate {
    pub time: DateTime<Utc>,
    pub message: String,
    /// Stage tag in effect when the update was recorded (may be empty).
    pub stage: String,
}

/// The four-field product of a podcast job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodcastResult {
    /// Sources and topics gathered during research.
    pub research: Value,
    pub summary: String,
    pub script: String,
    /// Voice and production guidance.
    pub audio_details: Value,
}

impl Default for PodcastResult {
    fn default() -> Self {
        Self {
            research: Value::Object(Map::new()),
            summary: String::new(),
            script: String::new(),
            audio_details: Value::Object(Map::new()),
        }
    }
}

/// A podcast-generation request and its accumulated state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub topic: String,
    pub hosts: Hosts,
    pub status: JobStatus,
    pub progress: u8,
    pub stages: [Stage; 5],
    pub current_stage: String,
    pub created_at: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub updates: Vec<JobUpdate>,
    pub result: PodcastResult,
}

impl Job {
    /// Create a queued job with an empty result.
    pub fn new(topic: impl Into<String>, hosts: Hosts) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            topic: topic.into(),
            hosts,
            status: JobStatus::Queued,
            progress: 0,
            stages: Stage::ALL,
            current_stage: String::new(),
            created_at: Utc::now(),
            start_time: None,
            end_time: None,
            updates: Vec::new(),
            result: PodcastResult::default(),
        }
    }

    /// Transition `queued -> running`.
    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.start_time = Some(Utc::now());
        self.add_update("Starting podcast creation process", Some(Stage::Research.as_str()));
    }

    /// Append an update, switching the current stage when a different one is given.
    ///
    /// Progress only moves forward: a recognized stage raises it to that
    /// stage's percentage unless it is already higher.
    pub fn add_update(&mut self, message: impl Into<String>, stage: Option<&str>) {
        let message = message.into();
        if let Some(tag) = stage {
            if tag != self.current_stage {
                self.current_stage = tag.to_string();
                if let Some(stage) = Stage::parse(tag) {
                    self.progress = self.progress.max(stage.progress());
                }
            }
        }

        info!(job_id = %self.id, stage = %self.current_stage, "{}", message);

        self.updates.push(JobUpdate {
            time: Utc::now(),
            message,
            stage: self.current_stage.clone(),
        });
    }

    /// Move to a terminal status. Progress is pinned at 100 only on success.
    pub fn complete(&mut self, success: bool) {
        self.status = if success {
            JobStatus::Completed
        } else {
            JobStatus::Failed
        };
        self.end_time = Some(Utc::now());
        if success {
            self.progress = 100;
            self.add_update(
                "Podcast creation completed successfully",
                Some(Stage::Complete.as_str()),
            );
        } else {
            let stage = self.current_stage.clone();
            self.add_update("Podcast creation failed", Some(&stage));
        }
    }

    /// Seconds between start and end, once both are known.
    pub fn duration_secs(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}

/// Errors raised when turning a submission into a job.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Invalid podcast request: {0}")]
    InvalidRequest(String),

    #[error("Job not found: {0}")]
    NotFound(String),
}

/// A submission as received from callers; omitted fields take configured defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodcastRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub hosts: Option<Vec<String>>,
}

impl PodcastRequest {
    /// Resolve defaults and build a queued job.
    pub fn into_job(self, defaults: &PodcastConfig) -> Result<Job, JobError> {
        let topic = self
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| defaults.default_topic.clone());

        let hosts = match self.hosts {
            None => defaults.default_hosts.clone(),
            Some(hosts) => {
                let hosts: Vec<String> = hosts.into_iter().map(|h| h.trim().to_string()).collect();
                if hosts.iter().any(|h| h.is_empty()) {
                    return Err(JobError::InvalidRequest(
                        "host names cannot be blank".to_string(),
                    ));
                }
                <Hosts>::try_from(hosts).map_err(|given| {
                    JobError::InvalidRequest(format!(
                        "exactly two hosts are required, got {}",
                        given.len()
                    ))
                })?
            }
        };

        Ok(Job::new(topic, hosts))
    }
}
