//! Analysis payload returned by the remote service.
//!
//! The service answers an analyze request with an array of groups, each group
//! an array of [`AnalysisResult`] units. The payload is nested exactly one
//! level deep; [`AnalysisResults::from_value`] enforces that shape and reports
//! anything else as [`AnalysisError::UnexpectedNesting`] instead of guessing.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// One sampled frame of telemetry for a processed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMatrixRow {
    /// Frame identifier (usually the extracted frame path)
    pub frame: String,
    /// Position in the video, `HH:MM:SS.mmm`
    pub timestamp: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_suspicious: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_in_question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_suspicious: Option<String>,
}

/// Verdict for one analysis unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    pub is_suspicious: bool,
    #[serde(default)]
    pub object_in_question: String,
    #[serde(default)]
    pub why_suspicious: String,
    /// Image references, only sent for suspicious units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// One unit of analysis output: a verdict plus the frames it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub result: AnalysisVerdict,
    #[serde(default)]
    pub matrix: Vec<AnalysisMatrixRow>,
}

/// Errors raised while decoding an analysis payload.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis payload must be a JSON array, found {0}")]
    NotAnArray(&'static str),

    #[error("Unexpected nesting at group {index}: expected depth 2, found depth {depth}")]
    UnexpectedNesting { index: usize, depth: usize },

    #[error("Invalid analysis unit at [{group}][{item}]: {source}")]
    InvalidUnit {
        group: usize,
        item: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw nested analysis response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct AnalysisResults {
    groups: Vec<Vec<AnalysisResult>>,
}

impl AnalysisResults {
    /// Wrap already-typed groups.
    pub fn new(groups: Vec<Vec<AnalysisResult>>) -> Self {
        Self { groups }
    }

    /// Decode from raw JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Decode from a JSON value, enforcing exactly one level of nesting.
    pub fn from_value(value: Value) -> Result<Self, AnalysisError> {
        let outer = match value {
            Value::Array(items) => items,
            other => return Err(AnalysisError::NotAnArray(json_kind(&other))),
        };

        let mut groups = Vec::with_capacity(outer.len());
        for (group_idx, group) in outer.into_iter().enumerate() {
            let items = match group {
                Value::Array(items) => items,
                Value::Object(_) => {
                    return Err(AnalysisError::UnexpectedNesting { index: group_idx, depth: 1 })
                }
                other => return Err(AnalysisError::NotAnArray(json_kind(&other))),
            };

            let mut units = Vec::with_capacity(items.len());
            for (item_idx, item) in items.into_iter().enumerate() {
                if item.is_array() {
                    return Err(AnalysisError::UnexpectedNesting { index: group_idx, depth: 3 });
                }
                let unit = serde_json::from_value(item).map_err(|source| AnalysisError::InvalidUnit {
                    group: group_idx,
                    item: item_idx,
                    source,
                })?;
                units.push(unit);
            }
            groups.push(units);
        }

        Ok(Self { groups })
    }

    /// Grouped units as received.
    pub fn groups(&self) -> &[Vec<AnalysisResult>] {
        &self.groups
    }

    /// Units in outer-then-inner order.
    pub fn flatten(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.groups.iter().flatten()
    }

    /// Total number of units across all groups.
    pub fn unit_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_count() == 0
    }
}

impl TryFrom<Value> for AnalysisResults {
    type Error = AnalysisError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl Serialize for AnalysisResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.groups.serialize(serializer)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
