//! Local playback source for the first selected video.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;
use vscan_models::{parse_timestamp_to_seconds, MediaFile, TimestampError};

use crate::error::SessionResult;

/// Reference to locally held video bytes used for in-app playback.
///
/// A source is tied to one selection state. The session revokes it whenever
/// the selection changes or is reset and issues a fresh one, so stale
/// handles can be detected by their `generation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSource {
    pub id: Uuid,
    pub generation: u64,
    pub path: PathBuf,
    pub name: String,
}

impl PlaybackSource {
    pub(crate) fn issue(file: &MediaFile, generation: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            path: file.path.clone(),
            name: file.name.clone(),
        }
    }

    /// Playback position for an event timestamp.
    pub fn seek_position(&self, timestamp: &str) -> SessionResult<Duration> {
        let seconds = parse_timestamp_to_seconds(timestamp)?;
        Duration::try_from_secs_f64(seconds)
            .map_err(|_| TimestampError::OutOfRange(timestamp.trim().to_string()).into())
    }
}
