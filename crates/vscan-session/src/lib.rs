//! Selection tracking, upload orchestration and result aggregation.
//!
//! This crate provides:
//! - [`FileSet`]: the ordered, deduplicated selection of videos
//! - [`UploadSession`]: the session handle front ends observe and mutate
//! - [`UploadOrchestrator`]: the sequential driver transferring each entry
//! - [`aggregate`]: the flattening of analysis payloads into suspicious events

pub mod aggregator;
pub mod config;
pub mod error;
pub mod events;
pub mod file_set;
pub mod orchestrator;
pub mod playback;
pub mod session;

pub use aggregator::{aggregate, AggregatedResults};
pub use config::{OrchestratorConfig, RerunPolicy};
pub use error::{SessionError, SessionResult};
pub use events::{ProcessingStatus, SessionEvent};
pub use file_set::FileSet;
pub use orchestrator::{OrchestrationSummary, UploadOrchestrator};
pub use playback::PlaybackSource;
pub use session::UploadSession;
