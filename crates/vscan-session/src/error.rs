//! Session error types.

use thiserror::Error;
use vscan_models::{EntryState, TimestampError};

pub type SessionResult<T> = Result<T, SessionError>;

/// Contract violations on the session API.
///
/// Transfer failures never show up here; they are recorded on the entry.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("An upload run is in progress; the selection cannot change")]
    RunInProgress,

    #[error("Entry index {index} out of range (selection has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Entry {index} is {state}; subtitles can only change while pending")]
    EntryNotPending { index: usize, state: EntryState },

    #[error("Invalid seek timestamp: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("Invalid rerun policy '{0}'. Use skip-completed or reattempt-all")]
    InvalidRerunPolicy(String),
}
