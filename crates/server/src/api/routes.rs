use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{handlers, middleware::metrics_middleware, podcasts};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Podcasts
        .route(
            "/podcasts",
            post(podcasts::create_podcast).get(podcasts::list_podcasts),
        )
        .route("/podcasts/{id}", get(podcasts::get_podcast));

    // Rendered audio segments and manifests
    let audio = ServeDir::new(state.audio_dir());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .nest_service("/audio", audio)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
