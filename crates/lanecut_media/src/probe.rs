use crate::error::Result;
use lanecut_core::types::TimeMs;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Conservative stand-in when nothing could be learned about the media.
pub const FALLBACK_DURATION: TimeMs = TimeMs(10_000);

const SIGNAL_PASSES: u32 = 3;
const SIGNAL_PASS_DELAY: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// Inspector seam
// ---------------------------------------------------------------------------

/// Raw signals a playback engine exposes for a media resource. Audio-track
/// detection is unreliable across engines, so several independent signals
/// are carried; any of them may be absent, and some arrive only after the
/// duration is known.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaMetadata {
    pub duration: Option<TimeMs>,
    pub decoded_audio_bytes: Option<u64>,
    pub audio_track_count: Option<u32>,
    pub engine_reports_audio: Option<bool>,
}

pub trait MediaInspector {
    fn inspect(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<MediaMetadata>> + Send;
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProbeOutcome {
    pub duration: TimeMs,
    pub has_audio: bool,
    /// True when the failure/timeout path was taken and the fields above
    /// are the conservative defaults rather than observed values.
    pub defaulted: bool,
}

impl ProbeOutcome {
    fn fallback() -> Self {
        Self {
            duration: FALLBACK_DURATION,
            has_audio: false,
            defaulted: true,
        }
    }
}

/// Inspect a media resource for duration and audio-track presence. Never
/// fails: any inspector error or timeout resolves to the conservative
/// default (10s, no audio).
///
/// The audio decision is deliberately asymmetric: with a valid duration but
/// no audio signal at all, audio is assumed PRESENT (better an empty audio
/// lane than a silently dropped soundtrack), while the no-signal failure
/// path above assumes absent.
pub async fn probe<I: MediaInspector>(inspector: &I, url: &str, timeout: Duration) -> ProbeOutcome {
    match tokio::time::timeout(timeout, settle(inspector, url)).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => {
            tracing::warn!("metadata probe failed for {}, using conservative defaults", url);
            ProbeOutcome::fallback()
        }
        Err(_) => {
            tracing::warn!("metadata probe timed out for {}, using conservative defaults", url);
            ProbeOutcome::fallback()
        }
    }
}

/// Duration-only probe for audio files, bounded by the caller's timeout.
/// `None` on any failure; the caller picks its own fallback.
pub async fn probe_duration<I: MediaInspector>(
    inspector: &I,
    url: &str,
    timeout: Duration,
) -> Option<TimeMs> {
    match tokio::time::timeout(timeout, inspector.inspect(url)).await {
        Ok(Ok(meta)) => meta.duration,
        _ => None,
    }
}

/// Re-inspect until both duration and an audio signal have settled, or the
/// pass budget runs out. Audio-track signals can lag the initial metadata.
async fn settle<I: MediaInspector>(inspector: &I, url: &str) -> Option<ProbeOutcome> {
    let mut meta = inspector.inspect(url).await.ok()?;
    let mut duration = meta.duration;

    for _ in 1..SIGNAL_PASSES {
        if duration.is_some() && audio_signal(&meta).is_some() {
            break;
        }
        tokio::time::sleep(SIGNAL_PASS_DELAY).await;
        match inspector.inspect(url).await {
            Ok(next) => {
                duration = duration.or(next.duration);
                meta = next;
            }
            Err(_) => break,
        }
    }

    let duration = duration?;
    Some(ProbeOutcome {
        duration,
        has_audio: audio_signal(&meta).unwrap_or(true),
        defaulted: false,
    })
}

/// Combine the independent audio signals into a verdict, or `None` when no
/// signal is available yet. Zero decoded bytes is not a signal; decoding
/// may simply not have started.
fn audio_signal(meta: &MediaMetadata) -> Option<bool> {
    if meta.decoded_audio_bytes.is_some_and(|bytes| bytes > 0) {
        return Some(true);
    }
    if let Some(count) = meta.audio_track_count {
        return Some(count > 0);
    }
    meta.engine_reports_audio
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedInspector(MediaMetadata);

    impl MediaInspector for FixedInspector {
        async fn inspect(&self, _url: &str) -> Result<MediaMetadata> {
            Ok(self.0.clone())
        }
    }

    struct FailingInspector;

    impl MediaInspector for FailingInspector {
        async fn inspect(&self, url: &str) -> Result<MediaMetadata> {
            Err(MediaError::ProbeUnavailable(url.to_string()))
        }
    }

    struct StalledInspector;

    impl MediaInspector for StalledInspector {
        async fn inspect(&self, _url: &str) -> Result<MediaMetadata> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(MediaMetadata::default())
        }
    }

    /// Duration on the first pass, audio-track list only on the second.
    struct LateSignalInspector {
        calls: AtomicU32,
    }

    impl MediaInspector for LateSignalInspector {
        async fn inspect(&self, _url: &str) -> Result<MediaMetadata> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MediaMetadata {
                duration: Some(TimeMs(5_000)),
                audio_track_count: (call >= 1).then_some(0),
                ..Default::default()
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn audio_track_count_positive() {
        let inspector = FixedInspector(MediaMetadata {
            duration: Some(TimeMs(8_000)),
            audio_track_count: Some(1),
            ..Default::default()
        });
        let outcome = probe(&inspector, "v.mp4", DEFAULT_PROBE_TIMEOUT).await;
        assert_eq!(outcome.duration, TimeMs(8_000));
        assert!(outcome.has_audio);
        assert!(!outcome.defaulted);
    }

    #[tokio::test(start_paused = true)]
    async fn decoded_bytes_trump_everything() {
        let inspector = FixedInspector(MediaMetadata {
            duration: Some(TimeMs(8_000)),
            decoded_audio_bytes: Some(4_096),
            audio_track_count: Some(0),
            ..Default::default()
        });
        let outcome = probe(&inspector, "v.mp4", DEFAULT_PROBE_TIMEOUT).await;
        assert!(outcome.has_audio);
    }

    #[tokio::test(start_paused = true)]
    async fn no_signal_with_duration_assumes_audio() {
        let inspector = FixedInspector(MediaMetadata {
            duration: Some(TimeMs(8_000)),
            decoded_audio_bytes: Some(0),
            ..Default::default()
        });
        let outcome = probe(&inspector, "v.mp4", DEFAULT_PROBE_TIMEOUT).await;
        assert!(outcome.has_audio, "no-signal bias leans positive");
        assert!(!outcome.defaulted);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_assumes_no_audio() {
        let outcome = probe(&FailingInspector, "v.mp4", DEFAULT_PROBE_TIMEOUT).await;
        assert_eq!(outcome.duration, FALLBACK_DURATION);
        assert!(!outcome.has_audio, "failure bias leans negative");
        assert!(outcome.defaulted);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_assumes_no_audio() {
        let outcome = probe(&StalledInspector, "v.mp4", Duration::from_secs(5)).await;
        assert_eq!(outcome.duration, FALLBACK_DURATION);
        assert!(!outcome.has_audio);
        assert!(outcome.defaulted);
    }

    #[tokio::test(start_paused = true)]
    async fn late_audio_signal_is_picked_up() {
        let inspector = LateSignalInspector {
            calls: AtomicU32::new(0),
        };
        let outcome = probe(&inspector, "v.mp4", DEFAULT_PROBE_TIMEOUT).await;
        // The second pass delivered audio_track_count = 0; without the
        // re-inspection the positive bias would have reported true.
        assert!(!outcome.has_audio);
        assert!(!outcome.defaulted);
        assert!(inspector.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_duration_falls_back() {
        let inspector = FixedInspector(MediaMetadata {
            audio_track_count: Some(2),
            ..Default::default()
        });
        let outcome = probe(&inspector, "v.mp4", DEFAULT_PROBE_TIMEOUT).await;
        assert!(outcome.defaulted);
        assert_eq!(outcome.duration, FALLBACK_DURATION);
    }

    #[tokio::test(start_paused = true)]
    async fn duration_only_probe() {
        let inspector = FixedInspector(MediaMetadata {
            duration: Some(TimeMs(123_000)),
            ..Default::default()
        });
        assert_eq!(
            probe_duration(&inspector, "a.mp3", Duration::from_secs(5)).await,
            Some(TimeMs(123_000))
        );
        assert_eq!(
            probe_duration(&FailingInspector, "a.mp3", Duration::from_secs(5)).await,
            None
        );
        assert_eq!(
            probe_duration(&StalledInspector, "a.mp3", Duration::from_secs(5)).await,
            None
        );
    }
}
