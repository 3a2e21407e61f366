//! Runs the crew for one job and always produces a complete result.

mod fallback;
mod normalizer;

pub use fallback::FallbackGenerator;
pub use normalizer::{FallbackReason, FallbackUse, Field, Normalized, ResultNormalizer};

use std::sync::Arc;

use chrono::Datelike;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::crew::{Crew, CrewRequest};
use crate::job::{Hosts, JobProgress, PodcastResult, Stage};
use crate::metrics::FALLBACK_USED;

/// Final product of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub result: PodcastResult,
    pub success: bool,
}

/// Drives a [`Crew`] and normalizes whatever it returns.
///
/// Stateless between jobs: each run only sees the topic, hosts and year.
#[derive(Clone)]
pub struct PipelineRunner {
    crew: Arc<dyn Crew>,
    clock: Arc<dyn Clock>,
    fallback: FallbackGenerator,
    year: Option<i32>,
}

impl PipelineRunner {
    pub fn new(crew: Arc<dyn Crew>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fallback: FallbackGenerator::new(Arc::clone(&clock)),
            crew,
            clock,
            year: None,
        }
    }

    /// Pin the year handed to the crew instead of using the clock's.
    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn fallback(&self) -> &FallbackGenerator {
        &self.fallback
    }

    pub async fn run(&self, topic: &str, hosts: &Hosts, progress: &JobProgress) -> PipelineOutcome {
        progress.stage(Stage::Research.as_str(), "Starting research on trending topics");

        let request = CrewRequest {
            job_id: progress.job_id().to_string(),
            topic: topic.to_string(),
            hosts: hosts.clone(),
            year: self.year.unwrap_or_else(|| self.clock.now().year()),
        };

        match self.crew.kickoff(&request, progress).await {
            Ok(output) => {
                info!(job_id = %request.job_id, kind = output.kind(), "Crew finished");
                let normalized = ResultNormalizer::new(&self.fallback).normalize(output, topic, hosts);
                self.report_fallback(&normalized.fallback, progress);
                progress.stage(Stage::Complete.as_str(), "Podcast generated successfully");
                PipelineOutcome {
                    result: normalized.result,
                    success: true,
                }
            }
            Err(e) => {
                error!(job_id = %request.job_id, error = %e, "Crew failed");
                FALLBACK_USED.with_label_values(&["crew_error"]).inc();
                progress.report(format!("Error: {}", e), None);
                PipelineOutcome {
                    result: self.failure_result(topic, hosts, &e.to_string()),
                    success: false,
                }
            }
        }
    }

    /// Fallback content carrying the error text in the summary.
    pub fn failure_result(&self, topic: &str, hosts: &Hosts, error: &str) -> PodcastResult {
        let mut result = self.fallback.generate(topic, hosts);
        result.summary = format!("Error: {}", error);
        result
    }

    fn report_fallback(&self, fallback: &FallbackUse, progress: &JobProgress) {
        match fallback {
            FallbackUse::None => {}
            FallbackUse::Partial(fields) => {
                FALLBACK_USED.with_label_values(&["missing_fields"]).inc();
                let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
                warn!(job_id = %progress.job_id(), fields = ?names, "Filled missing fields from fallback");
                progress.report(
                    format!("Generated fallback content for: {}", names.join(", ")),
                    None,
                );
            }
            FallbackUse::Full(reason) => {
                FALLBACK_USED.with_label_values(&[reason.as_str()]).inc();
                warn!(job_id = %progress.job_id(), reason = reason.as_str(), "Using fallback result");
                progress.report(
                    format!("Crew output unusable ({}), using fallback content", reason.as_str()),
                    None,
                );
            }
        }
    }
}
