//! Per-file upload lifecycle.
//!
//! A [`SelectionEntry`] tracks one selected video from admission until its
//! transfer finishes. State changes go through the methods below so the
//! progress invariants (`pending` at 0, `done` at 100) always hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::media::MediaFile;

/// Upload lifecycle state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    /// Admitted, waiting for a run
    #[default]
    Pending,
    /// Transfer in flight
    Uploading,
    /// Transfer succeeded
    Done,
    /// Transfer failed
    Error,
}

impl EntryState {
    /// Get string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Pending => "pending",
            EntryState::Uploading => "uploading",
            EntryState::Done => "done",
            EntryState::Error => "error",
        }
    }

    /// Check if this is a terminal state for the current run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryState::Done | EntryState::Error)
    }
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user-selected video awaiting or undergoing processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionEntry {
    /// The selected video
    pub file: MediaFile,
    /// Optional companion subtitle track
    pub subtitle: Option<MediaFile>,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Lifecycle state
    pub state: EntryState,
    /// Failure reason when `state` is `Error`
    pub error: Option<String>,
    /// When the entry was admitted
    pub added_at: DateTime<Utc>,
}

impl SelectionEntry {
    /// Create a new pending entry.
    pub fn new(file: MediaFile) -> Self {
        Self {
            file,
            subtitle: None,
            progress: 0,
            state: EntryState::Pending,
            error: None,
            added_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == EntryState::Pending
    }

    pub fn has_subtitle(&self) -> bool {
        self.subtitle.is_some()
    }

    /// Start a transfer attempt. Resets progress and any previous failure.
    pub fn begin_upload(&mut self) {
        self.state = EntryState::Uploading;
        self.progress = 0;
        self.error = None;
    }

    /// Advance progress while uploading.
    ///
    /// Progress never moves backwards and stays below 100 until
    /// [`complete`](Self::complete). Returns true if the value changed.
    pub fn advance_progress(&mut self, progress: u8) -> bool {
        if self.state != EntryState::Uploading {
            return false;
        }
        let next = progress.min(99);
        if next > self.progress {
            self.progress = next;
            true
        } else {
            false
        }
    }

    /// Mark the transfer as successful.
    pub fn complete(&mut self) {
        self.state = EntryState::Done;
        self.progress = 100;
        self.error = None;
    }

    /// Mark the transfer as failed with a reason.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = EntryState::Error;
        self.error = Some(reason.into());
    }
}
