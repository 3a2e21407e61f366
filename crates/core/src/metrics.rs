//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Jobs (submissions, outcomes, durations)
//! - Result normalization (fallback usage)
//! - External services (LLM, web search, text-to-speech)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs submitted total.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("balado_jobs_submitted_total", "Total podcast jobs submitted").unwrap()
});

/// Jobs reaching a terminal status.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("balado_jobs_finished_total", "Podcast jobs finished"),
        &["status"], // "completed", "failed"
    )
    .unwrap()
});

/// Job run time from start to terminal status.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "balado_job_duration_seconds",
            "Duration of podcast jobs from start to finish",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0]),
        &["status"],
    )
    .unwrap()
});

/// Fallback content substitutions.
pub static FALLBACK_USED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "balado_fallback_used_total",
            "Times fallback content replaced crew output",
        ),
        &["reason"], // "empty", "text_without_hosts", "no_usable_fields", "missing_fields", "crew_error"
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// Provider calls answered with simulated output.
pub static PROVIDER_DEGRADED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "balado_provider_degraded_total",
            "Provider calls that fell back to simulated output",
        ),
        &["provider"], // "serper", "elevenlabs"
    )
    .unwrap()
});

/// LLM tokens consumed.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("balado_llm_tokens_total", "LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(FALLBACK_USED.clone()),
        Box::new(PROVIDER_DEGRADED.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
