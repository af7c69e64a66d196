//! Orchestrator configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::SessionError;

/// Which entries a run picks up when the selection was processed before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RerunPolicy {
    /// Skip `done` entries; attempt `pending` and `error` ones
    #[default]
    SkipCompleted,
    /// Attempt every entry from scratch
    ReattemptAll,
}

impl RerunPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RerunPolicy::SkipCompleted => "skip-completed",
            RerunPolicy::ReattemptAll => "reattempt-all",
        }
    }
}

impl FromStr for RerunPolicy {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "skip-completed" | "skip" => Ok(RerunPolicy::SkipCompleted),
            "reattempt-all" | "all" => Ok(RerunPolicy::ReattemptAll),
            other => Err(SessionError::InvalidRerunPolicy(other.to_string())),
        }
    }
}

impl std::fmt::Display for RerunPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload orchestrator configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Interval of the approximate progress animation on the analyze path
    pub analyze_tick: Duration,
    /// Percentage points added per tick
    pub analyze_step: u8,
    /// Highest approximate progress before the response arrives
    pub analyze_ceiling: u8,
    /// Handling of entries left over from a previous run
    pub rerun_policy: RerunPolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            analyze_tick: Duration::from_millis(40),
            analyze_step: 2,
            analyze_ceiling: 95,
            rerun_policy: RerunPolicy::SkipCompleted,
        }
    }
}

impl OrchestratorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            analyze_tick: Duration::from_millis(
                std::env::var("VSCAN_ANALYZE_TICK_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|ms: &u64| *ms > 0)
                    .unwrap_or(40),
            ),
            rerun_policy: std::env::var("VSCAN_RERUN_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            ..Default::default()
        }
    }
}
