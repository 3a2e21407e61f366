pub mod clock;
pub mod config;
pub mod crew;
pub mod job;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod search;
pub mod testing;
pub mod tts;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LlmProvider,
    SanitizedConfig,
};
pub use crew::{AgentCrew, Crew, CrewError, CrewOutput, CrewRequest};
pub use job::{
    Job, JobError, JobQueue, JobStatus, JobUpdate, Placement, PodcastRequest, PodcastResult,
    QueueSnapshot, QueueStats, Stage,
};
pub use pipeline::{FallbackGenerator, PipelineOutcome, PipelineRunner};
