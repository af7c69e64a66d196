//! Upload session state shared by the orchestrator and front ends.
//!
//! An [`UploadSession`] is a cheap, cloneable handle. It owns the selection,
//! the latest analysis payload, the success counter and the playback source.
//! While a run is in progress the selection is frozen: `add_files`,
//! `remove`, `set_subtitle` and `reset` fail with
//! [`SessionError::RunInProgress`], and [`can_modify`](UploadSession::can_modify)
//! tells the presentation layer to disable those controls.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use vscan_models::{AnalysisResults, EntryState, MediaFile, SelectionEntry};

use crate::aggregator::{aggregate, AggregatedResults};
use crate::config::RerunPolicy;
use crate::error::{SessionError, SessionResult};
use crate::events::{ProcessingStatus, SessionEvent};
use crate::file_set::FileSet;
use crate::playback::PlaybackSource;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct UploadSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    files: RwLock<FileSet>,
    results: RwLock<Option<AnalysisResults>>,
    status: RwLock<ProcessingStatus>,
    playback: RwLock<Option<PlaybackSource>>,
    playback_generation: AtomicU64,
    running: AtomicBool,
    uploaded_count: AtomicUsize,
    events: broadcast::Sender<SessionEvent>,
}

/// Marks a run as in progress for as long as it is alive.
pub(crate) struct RunGuard {
    inner: Arc<SessionInner>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.inner.running.store(false, Ordering::SeqCst);
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                files: RwLock::new(FileSet::new()),
                results: RwLock::new(None),
                status: RwLock::new(ProcessingStatus::WaitingForFiles),
                playback: RwLock::new(None),
                playback_generation: AtomicU64::new(0),
                running: AtomicBool::new(false),
                uploaded_count: AtomicUsize::new(0),
                events,
            }),
        }
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Whether selection-changing controls should be enabled.
    pub fn can_modify(&self) -> bool {
        !self.is_running()
    }

    /// Call with the `files` write lock held, so a run cannot start between
    /// the check and the mutation.
    fn ensure_idle(&self) -> SessionResult<()> {
        if self.is_running() {
            return Err(SessionError::RunInProgress);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Admit candidates; returns the number accepted.
    pub async fn add_files(
        &self,
        candidates: impl IntoIterator<Item = MediaFile>,
    ) -> SessionResult<usize> {
        let mut files = self.inner.files.write().await;
        self.ensure_idle()?;
        let admitted = files.add_files(candidates);
        if admitted > 0 {
            info!(admitted, total = files.len(), "Files added");
            self.emit(SessionEvent::FilesAdded { count: admitted });
            self.refresh_playback(&files).await;
            drop(files);
            self.set_status(ProcessingStatus::Ready).await;
        }
        Ok(admitted)
    }

    pub async fn set_subtitle(&self, index: usize, subtitle: Option<MediaFile>) -> SessionResult<()> {
        let mut files = self.inner.files.write().await;
        self.ensure_idle()?;
        let attached = subtitle.is_some();
        files.set_subtitle(index, subtitle)?;
        drop(files);
        self.emit(SessionEvent::SubtitleChanged { index, attached });
        Ok(())
    }

    pub async fn remove(&self, index: usize) -> SessionResult<SelectionEntry> {
        let mut files = self.inner.files.write().await;
        self.ensure_idle()?;
        let removed = files.remove(index)?;
        info!(index, file = %removed.file.name, "File removed");
        self.emit(SessionEvent::FileRemoved {
            index,
            name: removed.file.name.clone(),
        });
        self.refresh_playback(&files).await;
        let empty = files.is_empty();
        drop(files);

        if empty {
            self.set_status(ProcessingStatus::WaitingForFiles).await;
        }
        Ok(removed)
    }

    /// Clear the selection and the success counter.
    pub async fn reset(&self) -> SessionResult<()> {
        let mut files = self.inner.files.write().await;
        self.ensure_idle()?;
        files.clear();
        self.inner.uploaded_count.store(0, Ordering::SeqCst);
        self.refresh_playback(&files).await;
        drop(files);

        self.set_status(ProcessingStatus::WaitingForFiles).await;
        self.emit(SessionEvent::Reset);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Copy of all entries in display order.
    pub async fn snapshot(&self) -> Vec<SelectionEntry> {
        self.inner.files.read().await.entries().to_vec()
    }

    pub async fn entry(&self, index: usize) -> Option<SelectionEntry> {
        self.inner.files.read().await.get(index).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.files.read().await.is_empty()
    }

    pub async fn total_size(&self) -> u64 {
        self.inner.files.read().await.total_size()
    }

    pub async fn status(&self) -> ProcessingStatus {
        *self.inner.status.read().await
    }

    /// Successful transfers in the current (or last) run.
    pub fn uploaded_count(&self) -> usize {
        self.inner.uploaded_count.load(Ordering::SeqCst)
    }

    pub async fn analysis_results(&self) -> Option<AnalysisResults> {
        self.inner.results.read().await.clone()
    }

    /// Suspicious events derived from the latest results.
    pub async fn aggregated(&self) -> Option<AggregatedResults> {
        self.inner.results.read().await.as_ref().map(aggregate)
    }

    pub async fn playback(&self) -> Option<PlaybackSource> {
        self.inner.playback.read().await.clone()
    }

    // ------------------------------------------------------------------
    // Orchestrator hooks
    // ------------------------------------------------------------------

    pub(crate) fn begin_run(&self) -> SessionResult<RunGuard> {
        self.inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SessionError::RunInProgress)?;
        self.inner.uploaded_count.store(0, Ordering::SeqCst);
        self.emit(SessionEvent::UploadedCount { count: 0 });
        Ok(RunGuard {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Move an entry to `uploading` and hand out its files.
    ///
    /// Reads the entry as it is now. Returns `None` when the policy says the
    /// entry is skipped.
    pub(crate) async fn claim_entry(
        &self,
        index: usize,
        policy: RerunPolicy,
    ) -> Option<(MediaFile, Option<MediaFile>)> {
        let mut files = self.inner.files.write().await;
        let entry = files.entry_mut(index).ok()?;

        if policy == RerunPolicy::SkipCompleted && entry.state == EntryState::Done {
            debug!(index, file = %entry.file.name, "Skipping completed entry");
            return None;
        }

        entry.begin_upload();
        let claimed = (entry.file.clone(), entry.subtitle.clone());
        self.emit_entry(index, entry);
        Some(claimed)
    }

    pub(crate) async fn advance_progress(&self, index: usize, progress: u8) {
        let mut files = self.inner.files.write().await;
        if let Ok(entry) = files.entry_mut(index) {
            if entry.advance_progress(progress) {
                self.emit_entry(index, entry);
            }
        }
    }

    pub(crate) async fn complete_entry(&self, index: usize) -> usize {
        if let Ok(entry) = self.inner.files.write().await.entry_mut(index) {
            entry.complete();
            self.emit_entry(index, entry);
        }
        let count = self.inner.uploaded_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.emit(SessionEvent::UploadedCount { count });
        count
    }

    pub(crate) async fn fail_entry(&self, index: usize, reason: String) {
        if let Ok(entry) = self.inner.files.write().await.entry_mut(index) {
            entry.fail(reason);
            self.emit_entry(index, entry);
        }
    }

    /// Replace any previous analysis payload.
    pub(crate) async fn store_results(&self, results: AnalysisResults) {
        let aggregated = aggregate(&results);
        *self.inner.results.write().await = Some(results);
        self.emit(SessionEvent::AnalysisReady {
            events: aggregated.events.len(),
            all_clear: aggregated.all_clear,
        });
    }

    pub(crate) async fn set_status(&self, status: ProcessingStatus) {
        let mut current = self.inner.status.write().await;
        if *current != status {
            *current = status;
            self.emit(SessionEvent::StatusChanged { status });
        }
    }

    pub(crate) fn emit_run_event(&self, event: SessionEvent) {
        self.emit(event);
    }

    fn emit_entry(&self, index: usize, entry: &SelectionEntry) {
        self.emit(SessionEvent::EntryUpdated {
            index,
            state: entry.state,
            progress: entry.progress,
            error: entry.error.clone(),
        });
    }

    /// Revoke the current playback source and issue one for the new first entry.
    async fn refresh_playback(&self, files: &FileSet) {
        let mut playback = self.inner.playback.write().await;
        if let Some(old) = playback.take() {
            debug!(generation = old.generation, "Revoking playback source");
            self.emit(SessionEvent::PlaybackRevoked {
                generation: old.generation,
            });
        }

        if let Some(first) = files.first() {
            let generation = self.inner.playback_generation.fetch_add(1, Ordering::SeqCst) + 1;
            let source = PlaybackSource::issue(&first.file, generation);
            self.emit(SessionEvent::PlaybackIssued {
                source: source.clone(),
            });
            *playback = Some(source);
        }
    }
}
