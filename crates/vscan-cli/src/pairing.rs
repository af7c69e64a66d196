//! Matching `--srt` arguments to the videos they were given alongside.

use vscan_models::{MediaFile, SelectionEntry};

/// Entry index of each input video, or `None` where the video was not admitted.
///
/// Admission drops rejected and duplicate videos, so entry positions can lag
/// behind argument positions. Each entry is claimed by the first input with
/// the same path.
pub fn entry_positions(inputs: &[MediaFile], entries: &[SelectionEntry]) -> Vec<Option<usize>> {
    let mut claimed = vec![false; entries.len()];
    inputs
        .iter()
        .map(|input| {
            let index = (0..entries.len())
                .find(|&i| !claimed[i] && entries[i].file.path == input.path)?;
            claimed[index] = true;
            Some(index)
        })
        .collect()
}
