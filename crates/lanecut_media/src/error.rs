use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Upload canceled")]
    Canceled,

    #[error("Metadata unavailable: {0}")]
    ProbeUnavailable(String),

    #[error("Companion audio placement failed: {0}")]
    CompanionPlacement(String),

    #[error(transparent)]
    Core(#[from] lanecut_core::error::CoreError),
}

impl MediaError {
    /// User-initiated cancels are suppressed from error reporting; every
    /// other variant is surfaced per file.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
