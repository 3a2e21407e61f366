//! Test doubles for the crew, LLM, search and progress seams.
//!
//! Exposed outside `cfg(test)` so the server's integration tests can build an
//! app without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use balado_core::testing::MockCrew;
//!
//! let crew = MockCrew::gated();
//! // submit jobs, inspect the queue while the first one is held...
//! crew.release(1);
//! ```

mod mock_crew;
mod mock_llm;
mod mock_search;
mod recording_observer;

pub use mock_crew::MockCrew;
pub use mock_llm::MockLlm;
pub use mock_search::MockSearch;
pub use recording_observer::{RecordedUpdate, RecordingObserver};

pub use crate::clock::FixedClock;
