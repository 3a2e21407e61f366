use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use balado_core::{
    load_config, validate_config, AgentCrew, Clock, JobQueue, PipelineRunner, SystemClock,
};
use balado_server::{create_router, AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("BALADO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "LLM provider: {} ({})",
        config.llm.provider.as_str(),
        config.llm.model
    );
    if config.search.api_key.is_none() {
        warn!("No search API key configured, research will use simulated results");
    }
    if config.tts.api_key.is_none() {
        warn!("No text-to-speech API key configured, audio will be stubbed");
    }

    // Output directory for rendered audio
    std::fs::create_dir_all(&config.output.audio_dir).with_context(|| {
        format!(
            "Failed to create audio directory {:?}",
            config.output.audio_dir
        )
    })?;
    info!("Audio directory: {:?}", config.output.audio_dir);

    // Crew, pipeline and queue
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let crew = AgentCrew::from_config(&config, Arc::clone(&clock))
        .context("Failed to create agent crew")?;
    let runner =
        PipelineRunner::new(Arc::new(crew), clock).with_year(config.podcast.current_year);
    let queue = JobQueue::new(runner);
    info!("Job queue ready");

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), queue));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
