//! Suspicious events derived from analysis output.

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::timestamp::{parse_timestamp_to_seconds, TimestampError};

/// Timestamp used when a suspicious unit carries no matrix rows.
pub const DEFAULT_EVENT_TIMESTAMP: &str = "00:00:00.000";

/// Flattened projection of one suspicious analysis unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspiciousEvent {
    pub images: Vec<String>,
    pub object_in_question: String,
    pub why_suspicious: String,
    /// Seek position, taken from the first matrix row
    pub timestamp: String,
}

impl SuspiciousEvent {
    /// Project an analysis unit, regardless of its verdict.
    pub fn from_result(unit: &AnalysisResult) -> Self {
        Self {
            images: unit.result.images.clone().unwrap_or_default(),
            object_in_question: unit.result.object_in_question.clone(),
            why_suspicious: unit.result.why_suspicious.clone(),
            timestamp: unit
                .matrix
                .first()
                .map(|row| row.timestamp.clone())
                .unwrap_or_else(|| DEFAULT_EVENT_TIMESTAMP.to_string()),
        }
    }

    /// Seek target in seconds.
    pub fn seek_seconds(&self) -> Result<f64, TimestampError> {
        parse_timestamp_to_seconds(&self.timestamp)
    }
}
