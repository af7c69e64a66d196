//! Shared data models for the vscan client.
//!
//! This crate provides Serde-serializable types for:
//! - Local media handles and admission rules
//! - Per-file upload lifecycle entries
//! - The nested analysis payload returned by the remote service
//! - Suspicious events derived from that payload
//! - Timestamp parsing for seek targets

pub mod analysis;
pub mod entry;
pub mod event;
pub mod media;
pub mod timestamp;
pub mod utils;
pub mod validation;

// Re-export common types
pub use analysis::{
    AnalysisError, AnalysisMatrixRow, AnalysisResult, AnalysisResults, AnalysisVerdict,
};
pub use entry::{EntryState, SelectionEntry};
pub use event::{SuspiciousEvent, DEFAULT_EVENT_TIMESTAMP};
pub use media::MediaFile;
pub use timestamp::{format_seconds, parse_timestamp_to_seconds, TimestampError};
pub use utils::format_file_size;
pub use validation::{
    admit, rejection_reason, AdmissionRejection, ACCEPTED_MEDIA_TYPES, MAX_FILE_SIZE,
};
