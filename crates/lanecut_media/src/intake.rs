use crate::error::{MediaError, Result};
use lanecut_core::types::OverlayKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FileInfo
// ---------------------------------------------------------------------------

/// What we know about a dropped or selected file before upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// MediaCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaCategory {
    Image,
    Video,
    Audio,
}

impl MediaCategory {
    pub fn overlay_kind(&self) -> OverlayKind {
        match self {
            Self::Image => OverlayKind::Image,
            Self::Video => OverlayKind::Video,
            Self::Audio => OverlayKind::Audio,
        }
    }
}

// ---------------------------------------------------------------------------
// Categorization
// ---------------------------------------------------------------------------

/// Categorize a file: MIME type first, file extension second.
pub fn detect_category(file: &FileInfo) -> Option<MediaCategory> {
    let mime = file.mime_type.to_lowercase();
    if mime.starts_with("image/") {
        return Some(MediaCategory::Image);
    }
    if mime.starts_with("video/") {
        return Some(MediaCategory::Video);
    }
    if mime.starts_with("audio/") {
        return Some(MediaCategory::Audio);
    }
    category_from_extension(&file.name)
}

fn category_from_extension(name: &str) -> Option<MediaCategory> {
    let ext = name.rsplit_once('.').map(|(_, e)| e.to_lowercase())?;
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "tiff" | "svg" => {
            Some(MediaCategory::Image)
        }
        "mp4" | "mov" | "mkv" | "webm" | "avi" | "m4v" => Some(MediaCategory::Video),
        "mp3" | "wav" | "flac" | "aac" | "ogg" | "m4a" | "wma" => Some(MediaCategory::Audio),
        _ => None,
    }
}

/// Accept a file or produce its per-file rejection reason.
pub fn validate(file: &FileInfo) -> Result<MediaCategory> {
    detect_category(file).ok_or_else(|| {
        MediaError::UnsupportedType(format!(
            "{}: not a recognized image, video or audio file",
            file.name
        ))
    })
}

/// Collapse per-file rejection reasons into one user-facing message: the
/// first three reasons, with a count suffix when more were dropped.
pub fn rejection_summary(reasons: &[String]) -> Option<String> {
    if reasons.is_empty() {
        return None;
    }
    let shown = reasons.iter().take(3).cloned().collect::<Vec<_>>().join("; ");
    if reasons.len() > 3 {
        Some(format!("{shown}; …and {} more", reasons.len() - 3))
    } else {
        Some(shown)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
