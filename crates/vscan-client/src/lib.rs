//! Client for the remote video analysis service.
//!
//! This crate wraps the two multipart endpoints the service exposes
//! (`/uploadfile` and `/analyze`) plus the health and stored-result lookups,
//! and defines the [`MediaTransfer`] seam the upload orchestrator drives.

pub mod client;
pub mod error;
pub mod transfer;
pub mod types;

pub use client::{AnalysisClient, ClientConfig};
pub use error::{TransferError, TransferResult};
pub use transfer::MediaTransfer;
pub use types::{ProgressCallback, UploadProgress, UploadReceipt};
