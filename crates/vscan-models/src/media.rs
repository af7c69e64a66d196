//! Local media file handles.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Handle to a local file selected by the user.
///
/// Carries the metadata a browser would report for a picked file: name,
/// byte size and the declared media type. The handle never reads the file
/// contents itself; transfers open the path when they need the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Location on disk
    pub path: PathBuf,
    /// File name (last path component)
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Declared media type, e.g. `video/mp4`
    pub media_type: String,
}

impl MediaFile {
    /// Create a handle from explicit metadata.
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        size: u64,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size,
            media_type: media_type.into(),
        }
    }

    /// Build a handle by inspecting a file on disk.
    ///
    /// The media type is derived from the extension, never sniffed.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Not a regular file: {}", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            media_type: media_type_for_path(path).to_string(),
            name,
            size: metadata.len(),
        })
    }

    /// Key used to detect duplicate selections.
    pub fn dedup_key(&self) -> (&str, u64) {
        (&self.name, self.size)
    }
}

/// Declared media type for a path, based on its extension.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "avi" => "video/avi",
        "mov" => "video/mov",
        "mkv" => "video/mkv",
        "webm" => "video/webm",
        "srt" => "application/x-subrip",
        "vtt" => "text/vtt",
        _ => "application/octet-stream",
    }
}
