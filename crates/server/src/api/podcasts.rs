//! Podcast job API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use balado_core::{Job, JobError, Placement, PodcastRequest, QueueSnapshot};

use crate::state::AppState;

/// Response for an accepted submission
#[derive(Debug, Serialize)]
pub struct CreatePodcastResponse {
    pub job_id: String,
    pub accepted: bool,
    pub placement: Placement,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn job_error(e: JobError) -> ApiError {
    let status = match e {
        JobError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        JobError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// Submit a podcast job
pub async fn create_podcast(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PodcastRequest>,
) -> Result<(StatusCode, Json<CreatePodcastResponse>), ApiError> {
    let job = body
        .into_job(state.podcast_defaults())
        .map_err(job_error)?;
    let job_id = job.id.clone();
    info!(job_id = %job_id, topic = %job.topic, "Podcast requested");

    let placement = state.queue().submit(job);

    Ok((
        StatusCode::ACCEPTED,
        Json(CreatePodcastResponse {
            job_id,
            accepted: true,
            placement,
        }),
    ))
}

/// Get a podcast job by ID
pub async fn get_podcast(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    state
        .queue()
        .get(&id)
        .map(Json)
        .ok_or_else(|| job_error(JobError::NotFound(id)))
}

/// List all podcast jobs in submission order
pub async fn list_podcasts(State(state): State<Arc<AppState>>) -> Json<QueueSnapshot> {
    Json(state.queue().list())
}
