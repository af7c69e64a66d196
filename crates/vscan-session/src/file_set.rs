//! Ordered selection of admitted video files.
//!
//! Insertion order is display order and processing order. Entries are unique
//! by (name, size): a candidate matching an existing entry, or one admitted
//! earlier in the same batch, is dropped.

use std::collections::HashSet;

use tracing::debug;
use vscan_models::validation::rejection_reason;
use vscan_models::{MediaFile, SelectionEntry};

use crate::error::{SessionError, SessionResult};

#[derive(Debug, Clone, Default)]
pub struct FileSet {
    entries: Vec<SelectionEntry>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit candidates, returning how many became entries.
    ///
    /// Validation runs before deduplication. Rejected and duplicate
    /// candidates are dropped silently; zero admissions is not an error.
    pub fn add_files(&mut self, candidates: impl IntoIterator<Item = MediaFile>) -> usize {
        let mut seen: HashSet<(String, u64)> = self
            .entries
            .iter()
            .map(|e| {
                let (name, size) = e.file.dedup_key();
                (name.to_string(), size)
            })
            .collect();

        let mut admitted = 0;
        for candidate in candidates {
            if let Some(reason) = rejection_reason(&candidate) {
                debug!(file = %candidate.name, "Candidate rejected: {}", reason);
                continue;
            }
            let (name, size) = candidate.dedup_key();
            if !seen.insert((name.to_string(), size)) {
                debug!(file = %candidate.name, size = candidate.size, "Duplicate selection dropped");
                continue;
            }
            self.entries.push(SelectionEntry::new(candidate));
            admitted += 1;
        }
        admitted
    }

    /// Attach or clear the subtitle of a pending entry.
    pub fn set_subtitle(&mut self, index: usize, subtitle: Option<MediaFile>) -> SessionResult<()> {
        let entry = self.entry_mut(index)?;
        if !entry.is_pending() {
            return Err(SessionError::EntryNotPending {
                index,
                state: entry.state,
            });
        }
        entry.subtitle = subtitle;
        Ok(())
    }

    /// Remove an entry; later entries shift down by one.
    pub fn remove(&mut self, index: usize) -> SessionResult<SelectionEntry> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: usize) -> Option<&SelectionEntry> {
        self.entries.get(index)
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> SessionResult<&mut SelectionEntry> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange { index, len })
    }

    fn check_index(&self, index: usize) -> SessionResult<()> {
        if index >= self.entries.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&SelectionEntry> {
        self.entries.first()
    }

    /// Combined size of all selected videos in bytes.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.file.size).sum()
    }
}
