//! Scripted transfer used in place of the HTTP client.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use vscan_client::{
    MediaTransfer, ProgressCallback, TransferError, TransferResult, UploadProgress, UploadReceipt,
};
use vscan_models::{AnalysisResults, MediaFile};
use vscan_session::SessionEvent;

#[derive(Default)]
pub struct ScriptedTransfer {
    /// Transfers in the order they were invoked, e.g. `upload:a.mp4`
    pub calls: Mutex<Vec<String>>,
    /// Files whose next transfer fails; the failure is consumed
    pub failing: Mutex<HashSet<String>>,
    /// Analyze payload per video name
    pub analysis: HashMap<String, AnalysisResults>,
    /// Byte counts reported by uploads before they finish
    pub progress_steps: Vec<u64>,
    /// Time an analyze request takes
    pub analyze_delay: Duration,
    /// (started, release) pair pausing every transfer until released
    pub gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedTransfer {
    pub fn failing_once(mut self, names: &[&str]) -> Self {
        self.failing = Mutex::new(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: String, name: &str) -> TransferResult<()> {
        self.calls.lock().unwrap().push(call);

        if let Some((started, release)) = &self.gate {
            started.notify_one();
            release.notified().await;
        }

        if self.failing.lock().unwrap().remove(name) {
            return Err(TransferError::Status {
                status: 500,
                body: format!("processing {} failed", name),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MediaTransfer for ScriptedTransfer {
    async fn upload(
        &self,
        video: &MediaFile,
        _subtitle: Option<&MediaFile>,
        on_progress: ProgressCallback,
    ) -> TransferResult<UploadReceipt> {
        for sent in &self.progress_steps {
            on_progress(UploadProgress {
                sent: *sent,
                total: video.size,
            });
            tokio::task::yield_now().await;
        }
        self.enter(format!("upload:{}", video.name), &video.name).await?;
        Ok(UploadReceipt {
            filename: Some(video.name.clone()),
            detail: Some("File uploaded successfully".into()),
        })
    }

    async fn analyze(
        &self,
        video: &MediaFile,
        _subtitle: &MediaFile,
    ) -> TransferResult<AnalysisResults> {
        if !self.analyze_delay.is_zero() {
            tokio::time::sleep(self.analyze_delay).await;
        }
        self.enter(format!("analyze:{}", video.name), &video.name).await?;
        Ok(self.analysis.get(&video.name).cloned().unwrap_or_default())
    }
}

pub fn video(name: &str, size: u64) -> MediaFile {
    MediaFile::new(format!("/videos/{}", name), name, size, "video/mp4")
}

pub fn subtitle(name: &str) -> MediaFile {
    MediaFile::new(format!("/videos/{}", name), name, 64, "application/x-subrip")
}

pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
