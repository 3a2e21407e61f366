//! Progress reporting from the pipeline back to job storage.

use std::sync::Arc;

/// Receives progress updates for a job.
pub trait JobObserver: Send + Sync {
    fn on_update(&self, job_id: &str, message: &str, stage: Option<&str>);
}

/// A job id bound to the observer its updates go to.
///
/// Handed to the pipeline runner and the crew so they can report without
/// touching the job registry.
#[derive(Clone)]
pub struct JobProgress {
    job_id: String,
    observer: Arc<dyn JobObserver>,
}

impl JobProgress {
    pub fn new(job_id: impl Into<String>, observer: Arc<dyn JobObserver>) -> Self {
        Self {
            job_id: job_id.into(),
            observer,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Report a message, optionally tagging it with a stage.
    pub fn report(&self, message: impl AsRef<str>, stage: Option<&str>) {
        self.observer
            .on_update(&self.job_id, message.as_ref(), stage);
    }

    /// Report a message tagged with `stage`.
    pub fn stage(&self, stage: &str, message: impl AsRef<str>) {
        self.report(message, Some(stage));
    }
}

impl std::fmt::Debug for JobProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobProgress")
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}
