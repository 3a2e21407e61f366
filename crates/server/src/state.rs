use std::path::Path;

use balado_core::config::PodcastConfig;
use balado_core::{Config, JobQueue, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    queue: JobQueue,
}

impl AppState {
    pub fn new(config: Config, queue: JobQueue) -> Self {
        Self { config, queue }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    /// Defaults for submissions that omit the topic or hosts.
    pub fn podcast_defaults(&self) -> &PodcastConfig {
        &self.config.podcast
    }

    pub fn audio_dir(&self) -> &Path {
        &self.config.output.audio_dir
    }
}
