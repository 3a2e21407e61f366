//! Observer that keeps every update in memory.

use std::sync::{Mutex, PoisonError};

use crate::job::JobObserver;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    pub job_id: String,
    pub message: String,
    pub stage: Option<String>,
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    updates: Mutex<Vec<RecordedUpdate>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.updates().into_iter().map(|u| u.message).collect()
    }
}

impl JobObserver for RecordingObserver {
    fn on_update(&self, job_id: &str, message: &str, stage: Option<&str>) {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedUpdate {
                job_id: job_id.to_string(),
                message: message.to_string(),
                stage: stage.map(str::to_string),
            });
    }
}
