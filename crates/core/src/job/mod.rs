//! Podcast jobs: the record, progress reporting and the single-flight queue.

mod observer;
mod queue;
mod types;

pub use observer::{JobObserver, JobProgress};
pub use queue::{JobQueue, Placement, QueueSnapshot, QueueStats};
pub use types::*;
