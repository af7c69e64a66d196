//! Request/response types for the analysis service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Receipt returned by the plain upload endpoint.
///
/// Only the status of the upload is significant; the body is decoded when the
/// server sends one and ignored otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Byte-level progress of a streaming upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes of the video body handed to the connection so far
    pub sent: u64,
    /// Total bytes of the video body
    pub total: u64,
}

impl UploadProgress {
    /// Whole percentage in [0, 100].
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.sent.min(self.total) as f64 / self.total as f64) * 100.0).floor() as u8
    }
}

/// Callback type for upload progress updates.
pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync + 'static>;
