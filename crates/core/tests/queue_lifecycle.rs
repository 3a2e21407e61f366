//! Job queue lifecycle integration tests.
//!
//! These tests drive the queue with a scripted crew:
//! - FIFO promotion with a single running job
//! - Failure and panic handling with fallback results
//! - Request validation and defaults

use std::sync::Arc;
use std::time::Duration;

use balado_core::{
    config::PodcastConfig,
    testing::{FixedClock, MockCrew},
    CrewError, Job, JobQueue, JobStatus, PipelineRunner, Placement, PodcastRequest,
};

struct TestHarness {
    queue: JobQueue,
    crew: Arc<MockCrew>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_crew(MockCrew::new())
    }

    fn gated() -> Self {
        Self::with_crew(MockCrew::gated())
    }

    fn with_crew(crew: MockCrew) -> Self {
        let crew = Arc::new(crew);
        let clock = Arc::new(FixedClock::at_date(2025, 6, 1).expect("valid date"));
        let runner = PipelineRunner::new(crew.clone(), clock);
        Self {
            queue: JobQueue::new(runner),
            crew,
        }
    }

    fn submit(&self, topic: &str, hosts: [&str; 2]) -> String {
        let job = Job::new(topic, hosts.map(str::to_string));
        let id = job.id.clone();
        self.queue.submit(job);
        id
    }

    async fn wait_for_terminal(&self, job_id: &str) -> Job {
        for _ in 0..300 {
            if let Some(job) = self.queue.get(job_id) {
                if job.status.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    async fn wait_for_calls(&self, count: usize) {
        for _ in 0..300 {
            if self.crew.calls().await.len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("crew never reached {} calls", count);
    }

    fn running_count(&self) -> usize {
        self.queue
            .list()
            .podcasts
            .iter()
            .filter(|j| j.status == JobStatus::Running)
            .count()
    }
}

#[tokio::test]
async fn test_jobs_run_one_at_a_time_in_submission_order() {
    let h = TestHarness::gated();
    let first = h.submit("Un", ["Alex", "Jamie"]);
    let second = h.submit("Deux", ["Alex", "Jamie"]);
    let third = h.submit("Trois", ["Alex", "Jamie"]);

    h.wait_for_calls(1).await;
    assert_eq!(h.running_count(), 1);
    assert_eq!(h.queue.list().current_job.as_deref(), Some(first.as_str()));
    assert_eq!(h.queue.stats().queue_length, 2);

    h.crew.release(1);
    h.wait_for_terminal(&first).await;
    h.wait_for_calls(2).await;
    assert_eq!(h.running_count(), 1);
    assert_eq!(h.queue.get(&second).unwrap().status, JobStatus::Running);
    assert_eq!(h.queue.get(&third).unwrap().status, JobStatus::Queued);

    h.crew.release(2);
    h.wait_for_terminal(&third).await;

    let topics: Vec<String> = h.crew.calls().await.into_iter().map(|c| c.topic).collect();
    assert_eq!(topics, ["Un", "Deux", "Trois"]);

    let stats = h.queue.stats();
    assert!(!stats.active);
    assert_eq!(stats.queue_length, 0);
    assert!(h
        .queue
        .list()
        .podcasts
        .iter()
        .all(|j| j.status == JobStatus::Completed && j.progress == 100));
}

#[tokio::test]
async fn test_successful_job_has_full_result() {
    let h = TestHarness::new();
    let id = h.submit("Le hockey", ["Alex", "Simon"]);

    let job = h.wait_for_terminal(&id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.current_stage, "complete");
    assert!(job.start_time.is_some());
    assert!(job.end_time.is_some());
    assert!(job.result.script.contains("Alex:"));
    assert!(job.result.script.contains("Simon:"));
    assert!(!job.result.summary.is_empty());
    assert_eq!(
        job.updates.last().unwrap().message,
        "Podcast creation completed successfully"
    );
}

#[tokio::test]
async fn test_crew_failure_marks_job_failed_with_fallback() {
    let h = TestHarness::new();
    h.crew
        .push_error(CrewError::Unavailable("LLM endpoint unreachable".to_string()))
        .await;

    let id = h.submit("Quantum Computing", ["Alex", "Simon"]);
    let job = h.wait_for_terminal(&id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.progress < 100);
    assert!(job.result.summary.starts_with("Error:"));
    assert!(job.result.script.contains("Alex"));
    assert!(job.result.script.contains("Simon"));
    assert!(job.result.script.contains("Quantum Computing"));
    assert!(job.result.research.is_object());
    assert!(job.result.audio_details.is_object());
    assert_eq!(job.updates.last().unwrap().message, "Podcast creation failed");
}

#[test]
fn test_progress_never_decreases_across_out_of_order_stages() {
    let mut job = Job::new("Le hockey", ["Alex".to_string(), "Simon".to_string()]);
    let mut seen = Vec::new();

    job.start();
    seen.push(job.progress);
    for stage in ["script", "research", "voice", "summarize", "debug", "research"] {
        job.add_update(format!("Now in {stage}"), Some(stage));
        seen.push(job.progress);
    }
    job.complete(true);
    seen.push(job.progress);

    assert!(
        seen.windows(2).all(|pair| pair[0] <= pair[1]),
        "progress went backwards: {seen:?}"
    );
    assert_eq!(seen, vec![0, 40, 40, 60, 60, 60, 60, 100]);
}

#[test]
fn test_failed_job_keeps_highest_progress() {
    let mut job = Job::new("Le hockey", ["Alex".to_string(), "Simon".to_string()]);
    job.start();
    job.add_update("Voicing", Some("voice"));
    job.add_update("Rechecking sources", Some("research"));
    job.complete(false);

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.progress, 60);
}

#[tokio::test]
async fn test_panicking_crew_fails_job_and_queue_continues() {
    let h = TestHarness::new();
    h.crew.push_panic("agent blew up").await;

    let first = h.submit("Un", ["Alex", "Jamie"]);
    let second = h.submit("Deux", ["Alex", "Jamie"]);

    let failed = h.wait_for_terminal(&first).await;
    assert_eq!(failed.status, JobStatus::Failed);
    assert!(failed.result.summary.starts_with("Error: pipeline task aborted"));
    assert!(failed.result.script.contains("Jamie"));

    let next = h.wait_for_terminal(&second).await;
    assert_eq!(next.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_failure_does_not_block_following_jobs() {
    let h = TestHarness::new();
    h.crew
        .push_error(CrewError::Unavailable("boom".to_string()))
        .await;

    let first = h.submit("Un", ["Alex", "Jamie"]);
    let second = h.submit("Deux", ["Alex", "Jamie"]);

    assert_eq!(h.wait_for_terminal(&first).await.status, JobStatus::Failed);
    assert_eq!(h.wait_for_terminal(&second).await.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_request_defaults_and_validation() {
    let defaults = PodcastConfig::default();
    let h = TestHarness::gated();

    let request: PodcastRequest = serde_json::from_str("{}").unwrap();
    let job = request.into_job(&defaults).unwrap();
    assert_eq!(job.topic, "Current Events");
    assert_eq!(job.hosts, ["Alex".to_string(), "Jamie".to_string()]);
    assert_eq!(h.queue.submit(job), Placement::Started);

    let request: PodcastRequest =
        serde_json::from_str(r#"{"topic": "Hockey", "hosts": ["Solo"]}"#).unwrap();
    assert!(request.into_job(&defaults).is_err());
    assert_eq!(h.queue.list().podcasts.len(), 1);

    h.crew.release(1);
}
