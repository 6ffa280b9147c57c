use crate::types::OverlayKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Row {0} is out of bounds (track count {1})")]
    RowOutOfBounds(u32, u32),

    #[error("No dedicated row for kind: {0}")]
    KindNotAllocatable(OverlayKind),

    #[error("Overlay not found: {0}")]
    OverlayNotFound(uuid::Uuid),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
