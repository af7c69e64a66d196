//! Session change notifications for presentation layers.
//!
//! Every observable mutation of an [`UploadSession`](crate::UploadSession)
//! is published on a broadcast channel. Front ends subscribe and re-render;
//! they never poke at session state directly.

use serde::Serialize;
use vscan_models::EntryState;

use crate::orchestrator::OrchestrationSummary;
use crate::playback::PlaybackSource;

/// Coarse status line shown above the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Nothing selected yet
    #[default]
    WaitingForFiles,
    /// Files selected, no run started
    Ready,
    /// Plain upload in flight
    Uploading,
    /// Combined analyze request in flight
    Analyzing,
    /// Last run finished
    Complete,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::WaitingForFiles => "waiting for files",
            ProcessingStatus::Ready => "ready",
            ProcessingStatus::Uploading => "uploading",
            ProcessingStatus::Analyzing => "analyzing",
            ProcessingStatus::Complete => "complete",
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Candidates were admitted (the "N files added" notice)
    FilesAdded { count: usize },
    /// An entry was removed by the user
    FileRemoved { index: usize, name: String },
    /// Subtitle attached or cleared
    SubtitleChanged { index: usize, attached: bool },
    /// Entry state or progress changed
    EntryUpdated {
        index: usize,
        state: EntryState,
        progress: u8,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Success counter changed
    UploadedCount { count: usize },
    StatusChanged { status: ProcessingStatus },
    RunStarted { entries: usize },
    RunFinished { summary: OrchestrationSummary },
    /// A new analysis payload replaced the previous one
    AnalysisReady { events: usize, all_clear: bool },
    PlaybackIssued { source: PlaybackSource },
    PlaybackRevoked { generation: u64 },
    /// Selection and results were cleared
    Reset,
}
