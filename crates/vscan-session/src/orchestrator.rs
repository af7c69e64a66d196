//! Sequential upload orchestration.
//!
//! Entries are transferred strictly in selection order with one transfer in
//! flight at a time. Each entry gets exactly one attempt per run; a failure
//! marks that entry `error` and the run moves on to the next one.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use vscan_client::{MediaTransfer, ProgressCallback, TransferResult, UploadProgress};
use vscan_models::{AnalysisResults, MediaFile};

use crate::config::OrchestratorConfig;
use crate::error::SessionResult;
use crate::events::{ProcessingStatus, SessionEvent};
use crate::session::UploadSession;

/// `tokio::time::interval` rejects a zero period.
const MIN_ANALYZE_TICK: Duration = Duration::from_millis(1);

/// Outcome counts of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrchestrationSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entries left alone by the rerun policy
    pub skipped: usize,
    /// Whether an analyze transfer produced a new payload
    pub analysis_received: bool,
}

pub struct UploadOrchestrator<T> {
    transfer: T,
    config: OrchestratorConfig,
}

impl<T: MediaTransfer> UploadOrchestrator<T> {
    pub fn new(transfer: T, config: OrchestratorConfig) -> Self {
        Self { transfer, config }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    /// Process every entry of the session's selection.
    ///
    /// Fails only when another run already holds the session. Transfer
    /// failures are recorded on their entries.
    pub async fn run(&self, session: &UploadSession) -> SessionResult<OrchestrationSummary> {
        let _guard = session.begin_run()?;

        let total = session.len().await;
        info!(entries = total, policy = %self.config.rerun_policy, "Starting upload run");
        session.emit_run_event(SessionEvent::RunStarted { entries: total });

        let mut summary = OrchestrationSummary::default();

        for index in 0..total {
            let Some((video, subtitle)) = session.claim_entry(index, self.config.rerun_policy).await
            else {
                summary.skipped += 1;
                continue;
            };
            summary.attempted += 1;

            let outcome = match &subtitle {
                Some(srt) => {
                    session.set_status(ProcessingStatus::Analyzing).await;
                    self.analyze(session, index, &video, srt).await.map(Some)
                }
                None => {
                    session.set_status(ProcessingStatus::Uploading).await;
                    self.upload(session, index, &video).await.map(|_| None)
                }
            };

            match outcome {
                Ok(results) => {
                    if let Some(results) = results {
                        session.store_results(results).await;
                        summary.analysis_received = true;
                    }
                    let count = session.complete_entry(index).await;
                    summary.succeeded += 1;
                    info!(index, file = %video.name, uploaded = count, "Entry done");
                }
                Err(e) => {
                    warn!(index, file = %video.name, "Entry failed: {}", e);
                    session.fail_entry(index, e.to_string()).await;
                    summary.failed += 1;
                }
            }
        }

        session.set_status(ProcessingStatus::Complete).await;
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "Upload run finished"
        );
        session.emit_run_event(SessionEvent::RunFinished {
            summary: summary.clone(),
        });

        Ok(summary)
    }

    /// Plain upload; byte-level progress is applied as it arrives.
    async fn upload(
        &self,
        session: &UploadSession,
        index: usize,
        video: &MediaFile,
    ) -> TransferResult<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<UploadProgress>();
        let on_progress: ProgressCallback = Arc::new(move |progress| {
            let _ = tx.send(progress);
        });

        let transfer = self.transfer.upload(video, None, on_progress);
        tokio::pin!(transfer);

        loop {
            tokio::select! {
                result = &mut transfer => return result.map(|_| ()),
                Some(progress) = rx.recv() => {
                    session.advance_progress(index, progress.percent()).await;
                }
            }
        }
    }

    /// Combined analyze request; progress is approximated on a timer since
    /// the response carries no byte counts.
    async fn analyze(
        &self,
        session: &UploadSession,
        index: usize,
        video: &MediaFile,
        subtitle: &MediaFile,
    ) -> TransferResult<AnalysisResults> {
        let mut ticker = tokio::time::interval(self.config.analyze_tick.max(MIN_ANALYZE_TICK));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut approx: u8 = 0;

        let transfer = self.transfer.analyze(video, subtitle);
        tokio::pin!(transfer);

        loop {
            tokio::select! {
                result = &mut transfer => return result,
                _ = ticker.tick() => {
                    approx = approx
                        .saturating_add(self.config.analyze_step)
                        .min(self.config.analyze_ceiling);
                    session.advance_progress(index, approx).await;
                }
            }
        }
    }
}
