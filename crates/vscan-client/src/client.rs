//! Analysis service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response, Url};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use vscan_models::{AnalysisResults, MediaFile};

use crate::error::{TransferError, TransferResult};
use crate::transfer::MediaTransfer;
use crate::types::{ProgressCallback, UploadProgress, UploadReceipt};

const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Configuration for the analysis client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base origin of the analysis service
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            timeout: Duration::from_secs(1800), // analysis of long videos is slow
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("VSCAN_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("VSCAN_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1800),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("VSCAN_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

/// Client for the remote analysis service.
#[derive(Clone)]
pub struct AnalysisClient {
    http: Client,
    base_url: Url,
}

impl AnalysisClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> TransferResult<Self> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| TransferError::config(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransferError::config(format!(
                "base URL '{}' cannot carry paths",
                config.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(TransferError::Network)?;

        Ok(Self { http, base_url })
    }

    /// Create from environment variables.
    pub fn from_env() -> TransferResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> TransferResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransferError::config("base URL cannot carry paths"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check if the service answers on its root path.
    pub async fn health_check(&self) -> TransferResult<bool> {
        match self.http.get(self.base_url.clone()).send().await {
            Ok(response) if response.status().is_success() => Ok(true),
            Ok(response) => {
                warn!("Analysis service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Analysis service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Fetch a stored analysis document by name, e.g. `flight_result.json`.
    pub async fn fetch_result(&self, result_file: &str) -> TransferResult<AnalysisResults> {
        let url = self.endpoint(&["result", result_file])?;
        debug!("Fetching stored analysis from {}", url);

        let response = ensure_success(self.http.get(url).send().await?).await?;
        let bytes = response.bytes().await?;
        Ok(AnalysisResults::from_slice(&bytes)?)
    }

    /// Upload a video (and optional subtitle) without requesting analysis.
    pub async fn upload_file(
        &self,
        video: &MediaFile,
        subtitle: Option<&MediaFile>,
        on_progress: ProgressCallback,
    ) -> TransferResult<UploadReceipt> {
        let url = self.endpoint(&["uploadfile"])?;
        debug!(file = %video.name, size = video.size, "Uploading to {}", url);

        let mut form = Form::new().part("file", streaming_part(video, Some(on_progress)).await?);
        if let Some(srt) = subtitle {
            form = form.part("srt", buffered_part(srt).await?);
        }

        let response = ensure_success(self.http.post(url).multipart(form).send().await?).await?;
        let body = response.bytes().await?;

        // The receipt is informational; a non-JSON success body still counts.
        let receipt: UploadReceipt = serde_json::from_slice(&body).unwrap_or_default();
        info!(file = %video.name, "Upload complete");
        Ok(receipt)
    }

    /// Submit a video with its subtitle track and return the analysis payload.
    pub async fn analyze_video(
        &self,
        video: &MediaFile,
        subtitle: &MediaFile,
    ) -> TransferResult<AnalysisResults> {
        let url = self.endpoint(&["analyze"])?;
        debug!(file = %video.name, srt = %subtitle.name, "Sending analysis request to {}", url);

        let form = Form::new()
            .part("file", streaming_part(video, None).await?)
            .part("srt", buffered_part(subtitle).await?);

        let response = ensure_success(self.http.post(url).multipart(form).send().await?).await?;
        let bytes = response.bytes().await?;
        let results = AnalysisResults::from_slice(&bytes)?;

        info!(
            file = %video.name,
            units = results.unit_count(),
            "Analysis complete"
        );
        Ok(results)
    }
}

#[async_trait]
impl MediaTransfer for AnalysisClient {
    async fn upload(
        &self,
        video: &MediaFile,
        subtitle: Option<&MediaFile>,
        on_progress: ProgressCallback,
    ) -> TransferResult<UploadReceipt> {
        self.upload_file(video, subtitle, on_progress).await
    }

    async fn analyze(
        &self,
        video: &MediaFile,
        subtitle: &MediaFile,
    ) -> TransferResult<AnalysisResults> {
        self.analyze_video(video, subtitle).await
    }
}

async fn ensure_success(response: Response) -> TransferResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransferError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Multipart part that streams the file from disk, counting bytes as they go.
async fn streaming_part(
    file: &MediaFile,
    on_progress: Option<ProgressCallback>,
) -> TransferResult<Part> {
    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(|e| TransferError::io(&file.path, e))?;

    let total = file.size;
    let mut sent = 0u64;
    let stream = ReaderStream::new(handle).inspect_ok(move |chunk| {
        sent += chunk.len() as u64;
        if let Some(callback) = &on_progress {
            callback(UploadProgress { sent, total });
        }
    });

    Part::stream_with_length(Body::wrap_stream(stream), total)
        .file_name(file.name.clone())
        .mime_str(&file.media_type)
        .map_err(TransferError::Network)
}

/// Multipart part for small companion files, read fully into memory.
async fn buffered_part(file: &MediaFile) -> TransferResult<Part> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| TransferError::io(&file.path, e))?;

    Part::bytes(bytes)
        .file_name(file.name.clone())
        .mime_str(&file.media_type)
        .map_err(TransferError::Network)
}
