use crate::error::{MediaError, Result};
use crate::intake::{FileInfo, MediaCategory};
use lanecut_core::types::TimeMs;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// Uploader seam
// ---------------------------------------------------------------------------

/// What the upload backend hands back for a stored file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
    pub thumbnail: Option<String>,
    /// Server-side duration, when the backend probes on ingest.
    pub duration: Option<TimeMs>,
    pub key: Option<String>,
}

/// Upload transport. The pipeline only cares about the served URL and the
/// optional server-side metadata; the wire details live behind this trait.
pub trait Uploader {
    fn upload(
        &self,
        file: &FileInfo,
        category: MediaCategory,
    ) -> impl std::future::Future<Output = Result<UploadedMedia>> + Send;
}

// ---------------------------------------------------------------------------
// Cancelation
// ---------------------------------------------------------------------------

/// Cancel side of an upload: calling `cancel` resolves the paired
/// `CancelSignal` and surfaces in-flight uploads as `MediaError::Canceled`,
/// a distinguished outcome so callers can keep user-initiated aborts out of
/// error reporting.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx: Some(rx) })
}

impl CancelSignal {
    /// A signal that never fires, for callers without a cancel affordance.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_canceled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves when canceled; pends forever otherwise, including when the
    /// handle is dropped without canceling.
    pub async fn canceled(&mut self) {
        let Some(rx) = &mut self.rx else {
            return std::future::pending().await;
        };
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

/// Race an upload against its cancel signal.
pub async fn upload_cancelable<U: Uploader>(
    uploader: &U,
    file: &FileInfo,
    category: MediaCategory,
    cancel: &mut CancelSignal,
) -> Result<UploadedMedia> {
    if cancel.is_canceled() {
        return Err(MediaError::Canceled);
    }
    tokio::select! {
        _ = cancel.canceled() => {
            tracing::debug!("upload of {} canceled", file.name);
            Err(MediaError::Canceled)
        }
        result = uploader.upload(file, category) => result,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct InstantUploader;

    impl Uploader for InstantUploader {
        async fn upload(&self, file: &FileInfo, _category: MediaCategory) -> Result<UploadedMedia> {
            Ok(UploadedMedia {
                url: format!("https://cdn/{}", file.name),
                thumbnail: None,
                duration: None,
                key: None,
            })
        }
    }

    struct StalledUploader;

    impl Uploader for StalledUploader {
        async fn upload(&self, _file: &FileInfo, _category: MediaCategory) -> Result<UploadedMedia> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!("upload should have been canceled");
        }
    }

    fn file() -> FileInfo {
        FileInfo::new("clip.mp4", "video/mp4", 1024)
    }

    #[tokio::test]
    async fn upload_completes_without_cancel() {
        let mut signal = CancelSignal::never();
        let result =
            upload_cancelable(&InstantUploader, &file(), MediaCategory::Video, &mut signal)
                .await
                .unwrap();
        assert_eq!(result.url, "https://cdn/clip.mp4");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_aborts_in_flight_upload() {
        let (handle, mut signal) = cancel_pair();
        let canceller = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.cancel();
        };
        let file = file();
        let (result, ()) = tokio::join!(
            upload_cancelable(&StalledUploader, &file, MediaCategory::Video, &mut signal),
            canceller
        );
        assert!(matches!(result, Err(MediaError::Canceled)));
    }

    #[tokio::test]
    async fn pre_canceled_signal_short_circuits() {
        let (handle, mut signal) = cancel_pair();
        handle.cancel();
        let result =
            upload_cancelable(&StalledUploader, &file(), MediaCategory::Video, &mut signal).await;
        assert!(matches!(result, Err(MediaError::Canceled)));
        assert!(signal.is_canceled());
    }

    #[tokio::test]
    async fn canceled_error_is_distinguished() {
        assert!(MediaError::Canceled.is_canceled());
        assert!(!MediaError::UploadFailed("boom".into()).is_canceled());
    }
}
