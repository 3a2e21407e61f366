//! Single-flight job queue.
//!
//! At most one job runs at a time. Later submissions wait in FIFO order and are
//! promoted one by one as the running job finishes, whether it succeeded or
//! failed. The registry, the active-job pointer and the pending queue share one
//! lock, so readers always see a whole job record.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{error, info};

use super::observer::{JobObserver, JobProgress};
use super::types::{Job, PodcastResult};
use crate::metrics::{JOBS_FINISHED, JOBS_SUBMITTED, JOB_DURATION};
use crate::pipeline::{PipelineOutcome, PipelineRunner};

/// Where a submitted job landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Placement {
    /// The job began running immediately.
    Started,
    /// The job is waiting; position 1 runs next.
    Queued { position: usize },
}

/// Point-in-time view of every job.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    /// All jobs in submission order.
    pub podcasts: Vec<Job>,
    pub current_job: Option<String>,
    pub queue_length: usize,
}

/// Counts used for gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStats {
    pub active: bool,
    pub queue_length: usize,
}

#[derive(Default)]
struct QueueState {
    jobs: HashMap<String, Job>,
    order: Vec<String>,
    active: Option<String>,
    pending: VecDeque<String>,
}

struct QueueInner {
    state: Mutex<QueueState>,
    runner: PipelineRunner,
}

impl QueueInner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobObserver for QueueInner {
    fn on_update(&self, job_id: &str, message: &str, stage: Option<&str>) {
        if let Some(job) = self.lock().jobs.get_mut(job_id) {
            job.add_update(message, stage);
        }
    }
}

/// Owns every job for the lifetime of the process. Cheap to clone.
#[derive(Clone)]
pub struct JobQueue {
    inner: Arc<QueueInner>,
}

impl JobQueue {
    pub fn new(runner: PipelineRunner) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                runner,
            }),
        }
    }

    /// Register a job and either start it or append it to the queue.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, mut job: Job) -> Placement {
        let job_id = job.id.clone();
        JOBS_SUBMITTED.inc();

        let placement = {
            let mut state = self.inner.lock();
            let placement = if state.active.is_none() {
                job.start();
                state.active = Some(job_id.clone());
                Placement::Started
            } else {
                state.pending.push_back(job_id.clone());
                let position = state.pending.len();
                job.add_update(format!("Job added to queue. Position: {}", position), None);
                Placement::Queued { position }
            };
            state.order.push(job_id.clone());
            state.jobs.insert(job_id.clone(), job);
            placement
        };

        match placement {
            Placement::Started => {
                info!(job_id = %job_id, "Job started");
                tokio::spawn(drive(Arc::clone(&self.inner), job_id));
            }
            Placement::Queued { position } => {
                info!(job_id = %job_id, position, "Job queued");
            }
        }

        placement
    }

    /// Snapshot of one job.
    pub fn get(&self, job_id: &str) -> Option<Job> {
        self.inner.lock().jobs.get(job_id).cloned()
    }

    /// Snapshot of all jobs plus the active id and queue length.
    pub fn list(&self) -> QueueSnapshot {
        let state = self.inner.lock();
        QueueSnapshot {
            podcasts: state
                .order
                .iter()
                .filter_map(|id| state.jobs.get(id).cloned())
                .collect(),
            current_job: state.active.clone(),
            queue_length: state.pending.len(),
        }
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.inner.lock();
        QueueStats {
            active: state.active.is_some(),
            queue_length: state.pending.len(),
        }
    }
}

/// Run the given job, then keep promoting queued jobs until none remain.
async fn drive(inner: Arc<QueueInner>, first: String) {
    let mut job_id = first;
    loop {
        let outcome = run_one(&inner, &job_id).await;

        let next = {
            let mut state = inner.lock();
            if let Some(job) = state.jobs.get_mut(&job_id) {
                job.result = outcome.result;
                job.complete(outcome.success);
                record_finished(job);
            }
            state.active = None;

            let next = state.pending.pop_front();
            if let Some(next_id) = &next {
                if let Some(job) = state.jobs.get_mut(next_id) {
                    job.start();
                }
                state.active = Some(next_id.clone());
            }
            next
        };

        match next {
            Some(next_id) => {
                info!(job_id = %next_id, "Promoted queued job");
                job_id = next_id;
            }
            None => break,
        }
    }
}

/// Run the pipeline in its own task so a panic fails the job instead of
/// stalling the queue.
async fn run_one(inner: &Arc<QueueInner>, job_id: &str) -> PipelineOutcome {
    let (topic, hosts) = match inner.lock().jobs.get(job_id) {
        Some(job) => (job.topic.clone(), job.hosts.clone()),
        None => {
            return PipelineOutcome {
                result: PodcastResult::default(),
                success: false,
            }
        }
    };

    let runner = inner.runner.clone();
    let observer: Arc<dyn JobObserver> = Arc::clone(inner) as Arc<dyn JobObserver>;
    let progress = JobProgress::new(job_id, observer);
    let task_topic = topic.clone();
    let task_hosts = hosts.clone();

    let handle =
        tokio::spawn(async move { runner.run(&task_topic, &task_hosts, &progress).await });

    match handle.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(job_id = %job_id, error = %e, "Pipeline task aborted");
            let message = format!("pipeline task aborted: {}", e);
            inner.on_update(job_id, &format!("Error: {}", message), None);
            PipelineOutcome {
                result: inner.runner.failure_result(&topic, &hosts, &message),
                success: false,
            }
        }
    }
}

fn record_finished(job: &Job) {
    let status = job.status.as_str();
    JOBS_FINISHED.with_label_values(&[status]).inc();
    if let Some(secs) = job.duration_secs() {
        JOB_DURATION.with_label_values(&[status]).observe(secs);
    }
}
