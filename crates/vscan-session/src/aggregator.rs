//! Flatten the nested analysis payload into suspicious events.

use serde::Serialize;
use vscan_models::{AnalysisResults, SuspiciousEvent};

/// Normalized view of one analysis payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedResults {
    /// Suspicious units in payload order
    pub events: Vec<SuspiciousEvent>,
    /// True when nothing suspicious was found
    pub all_clear: bool,
}

/// Flatten outer-then-inner, keep suspicious units, project them to events.
pub fn aggregate(raw: &AnalysisResults) -> AggregatedResults {
    let events: Vec<SuspiciousEvent> = raw
        .flatten()
        .filter(|unit| unit.result.is_suspicious)
        .map(SuspiciousEvent::from_result)
        .collect();

    AggregatedResults {
        all_clear: events.is_empty(),
        events,
    }
}
