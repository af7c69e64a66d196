//! Admission rules for selected video files.

use std::fmt;

use crate::media::MediaFile;

/// Media types accepted for upload. Compared by exact string equality.
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] = ["video/mp4", "video/avi", "video/mov", "video/mkv"];

/// Largest accepted file size in bytes (2 GiB, inclusive).
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Why a candidate was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionRejection {
    /// Declared media type is not in [`ACCEPTED_MEDIA_TYPES`]
    UnsupportedType(String),
    /// File is larger than [`MAX_FILE_SIZE`]
    TooLarge(u64),
}

impl fmt::Display for AdmissionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType(t) => write!(f, "unsupported media type '{}'", t),
            Self::TooLarge(size) => {
                write!(f, "file size {} exceeds limit of {} bytes", size, MAX_FILE_SIZE)
            }
        }
    }
}

/// Check a candidate against the admission rules.
pub fn rejection_reason(candidate: &MediaFile) -> Option<AdmissionRejection> {
    if !ACCEPTED_MEDIA_TYPES.contains(&candidate.media_type.as_str()) {
        return Some(AdmissionRejection::UnsupportedType(candidate.media_type.clone()));
    }
    if candidate.size > MAX_FILE_SIZE {
        return Some(AdmissionRejection::TooLarge(candidate.size));
    }
    None
}

/// Returns true iff the candidate may become a tracked entry.
pub fn admit(candidate: &MediaFile) -> bool {
    rejection_reason(candidate).is_none()
}
