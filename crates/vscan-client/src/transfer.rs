//! Transfer seam used by the upload orchestrator.

use async_trait::async_trait;
use vscan_models::{AnalysisResults, MediaFile};

use crate::error::TransferResult;
use crate::types::{ProgressCallback, UploadReceipt};

/// Moves selected media to the analysis service.
///
/// [`AnalysisClient`](crate::AnalysisClient) is the HTTP implementation;
/// tests substitute scripted transfers.
#[async_trait]
pub trait MediaTransfer: Send + Sync {
    /// Plain upload, reporting byte-level progress for the video body.
    async fn upload(
        &self,
        video: &MediaFile,
        subtitle: Option<&MediaFile>,
        on_progress: ProgressCallback,
    ) -> TransferResult<UploadReceipt>;

    /// Combined video + subtitle submission returning the analysis payload.
    async fn analyze(&self, video: &MediaFile, subtitle: &MediaFile)
        -> TransferResult<AnalysisResults>;
}
