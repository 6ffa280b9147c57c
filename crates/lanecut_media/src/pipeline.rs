use crate::error::{MediaError, Result};
use crate::intake::{rejection_summary, validate, FileInfo, MediaCategory};
use crate::probe::{probe, probe_duration, MediaInspector, DEFAULT_PROBE_TIMEOUT, FALLBACK_DURATION};
use crate::upload::{upload_cancelable, CancelSignal, UploadedMedia, Uploader};
use lanecut_core::tracks::TrackAllocator;
use lanecut_core::types::{Overlay, OverlayKind, TimeMs, Timeline};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Images get a fixed default length unless the server reports one.
pub const DEFAULT_IMAGE_DURATION: TimeMs = TimeMs(4_000);

/// Audio falls back to this when neither the server nor a direct probe
/// yields a duration.
pub const AUDIO_FALLBACK_DURATION: TimeMs = TimeMs(5_000);

const AUDIO_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_AUDIO_DURATION: TimeMs = TimeMs(1_000);

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Per-file result of a drop. Failures are isolated: one bad file never
/// aborts the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FileOutcome {
    Placed {
        file: String,
        overlays: Vec<Uuid>,
    },
    Rejected {
        file: String,
        reason: String,
    },
    UploadFailed {
        file: String,
        reason: String,
    },
    /// User-initiated abort; kept out of the rejection summary.
    Canceled {
        file: String,
    },
    PlacementFailed {
        file: String,
        reason: String,
    },
    /// The video overlay was placed but its extracted-audio companion was
    /// not. The video is kept.
    CompanionAudioFailed {
        file: String,
        video: Uuid,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DropReport {
    pub outcomes: Vec<FileOutcome>,
    /// First three rejection reasons, truncated with a count of the rest.
    pub rejection_summary: Option<String>,
}

impl DropReport {
    /// Ids of every overlay the batch created, including videos whose
    /// companion audio failed.
    pub fn placed(&self) -> Vec<Uuid> {
        let mut ids = vec![];
        for outcome in &self.outcomes {
            match outcome {
                FileOutcome::Placed { overlays, .. } => ids.extend(overlays),
                FileOutcome::CompanionAudioFailed { video, .. } => ids.push(*video),
                _ => {}
            }
        }
        ids
    }

    pub fn placed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    FileOutcome::Placed { .. } | FileOutcome::CompanionAudioFailed { .. }
                )
            })
            .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Rejected { .. }))
            .count()
    }
}

// ---------------------------------------------------------------------------
// DropPipeline
// ---------------------------------------------------------------------------

/// Converts dropped files into placed overlays: filter, categorize, upload,
/// probe, allocate a dedicated row, compute an append ("end-bar") start
/// time, create the overlay.
///
/// Files are processed strictly one at a time so the end-bar read for file
/// `i` reflects every placement from files before it.
pub struct DropPipeline<'a, U, I> {
    timeline: &'a mut Timeline,
    tracks: &'a mut TrackAllocator,
    uploader: &'a U,
    inspector: &'a I,
}

impl<'a, U: Uploader, I: MediaInspector> DropPipeline<'a, U, I> {
    pub fn new(
        timeline: &'a mut Timeline,
        tracks: &'a mut TrackAllocator,
        uploader: &'a U,
        inspector: &'a I,
    ) -> Self {
        Self {
            timeline,
            tracks,
            uploader,
            inspector,
        }
    }

    pub async fn process(&mut self, files: &[FileInfo]) -> DropReport {
        self.process_with_cancel(files, &mut CancelSignal::never())
            .await
    }

    pub async fn process_with_cancel(
        &mut self,
        files: &[FileInfo],
        cancel: &mut CancelSignal,
    ) -> DropReport {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let outcome = self.process_one(file, cancel).await;
            match &outcome {
                FileOutcome::Placed { file, overlays } => {
                    tracing::info!("placed {} ({} overlays)", file, overlays.len());
                }
                FileOutcome::Canceled { file } => {
                    tracing::debug!("upload of {} canceled", file);
                }
                FileOutcome::Rejected { file, reason }
                | FileOutcome::UploadFailed { file, reason }
                | FileOutcome::PlacementFailed { file, reason }
                | FileOutcome::CompanionAudioFailed { file, reason, .. } => {
                    tracing::warn!("{}: {}", file, reason);
                }
            }
            outcomes.push(outcome);
        }

        // Batch finished; let derived views recompute once.
        self.timeline.refresh();

        let reasons: Vec<String> = outcomes
            .iter()
            .filter_map(|o| match o {
                FileOutcome::Rejected { reason, .. } => Some(reason.clone()),
                _ => None,
            })
            .collect();
        DropReport {
            rejection_summary: rejection_summary(&reasons),
            outcomes,
        }
    }

    async fn process_one(&mut self, file: &FileInfo, cancel: &mut CancelSignal) -> FileOutcome {
        let category = match validate(file) {
            Ok(category) => category,
            Err(err) => {
                return FileOutcome::Rejected {
                    file: file.name.clone(),
                    reason: err.to_string(),
                }
            }
        };

        let uploaded = match upload_cancelable(self.uploader, file, category, cancel).await {
            Ok(uploaded) => uploaded,
            Err(MediaError::Canceled) => {
                return FileOutcome::Canceled {
                    file: file.name.clone(),
                }
            }
            Err(err) => {
                return FileOutcome::UploadFailed {
                    file: file.name.clone(),
                    reason: err.to_string(),
                }
            }
        };

        match category {
            MediaCategory::Image => {
                let placed = self.place_image(&uploaded);
                self.finish(file, placed)
            }
            MediaCategory::Audio => {
                let placed = self.place_audio(&uploaded).await;
                self.finish(file, placed)
            }
            MediaCategory::Video => self.place_video(file, &uploaded).await,
        }
    }

    fn finish(&self, file: &FileInfo, placed: Result<Uuid>) -> FileOutcome {
        match placed {
            Ok(id) => FileOutcome::Placed {
                file: file.name.clone(),
                overlays: vec![id],
            },
            Err(err) => FileOutcome::PlacementFailed {
                file: file.name.clone(),
                reason: err.to_string(),
            },
        }
    }

    /// Images append sequentially on the dedicated image row and never
    /// interleave with other kinds.
    fn place_image(&mut self, uploaded: &UploadedMedia) -> Result<Uuid> {
        let row = self.tracks.dedicated_row(OverlayKind::Image, self.timeline)?;
        let start = self.timeline.last_end_on_row(row);
        let duration = uploaded.duration.unwrap_or(DEFAULT_IMAGE_DURATION);
        let overlay = Overlay::new(OverlayKind::Image, row, start, duration, uploaded.url.clone());
        Ok(self.timeline.add_overlay(overlay)?)
    }

    /// Audio duration resolution order: server-reported, direct probe
    /// (5s bound, clamped to at least 1s), 5s fallback.
    async fn place_audio(&mut self, uploaded: &UploadedMedia) -> Result<Uuid> {
        let duration = match uploaded.duration {
            Some(duration) => duration,
            None => probe_duration(self.inspector, &uploaded.url, AUDIO_PROBE_TIMEOUT)
                .await
                .map(|d| d.max(MIN_AUDIO_DURATION))
                .unwrap_or(AUDIO_FALLBACK_DURATION),
        };
        let row = self.tracks.dedicated_row(OverlayKind::Audio, self.timeline)?;
        let start = self.timeline.last_end_for_kind(OverlayKind::Audio);
        let overlay = Overlay::new(OverlayKind::Audio, row, start, duration, uploaded.url.clone());
        Ok(self.timeline.add_overlay(overlay)?)
    }

    async fn place_video(&mut self, file: &FileInfo, uploaded: &UploadedMedia) -> FileOutcome {
        let outcome = probe(self.inspector, &uploaded.url, DEFAULT_PROBE_TIMEOUT).await;
        let (duration, has_audio) = if outcome.defaulted {
            // Probe gave up; prefer the server's duration over the bare
            // fallback and conservatively assume no audio track.
            (uploaded.duration.unwrap_or(FALLBACK_DURATION), false)
        } else {
            (outcome.duration, outcome.has_audio)
        };

        let (video_id, start) = match self.place_video_overlay(uploaded, duration, has_audio) {
            Ok(placed) => placed,
            Err(err) => {
                return FileOutcome::PlacementFailed {
                    file: file.name.clone(),
                    reason: err.to_string(),
                }
            }
        };

        if !has_audio {
            return FileOutcome::Placed {
                file: file.name.clone(),
                overlays: vec![video_id],
            };
        }

        // Frame-exact alignment: the extracted audio mirrors the video's
        // start and duration on a guaranteed-distinct row.
        match self.place_companion_audio(start, duration, &uploaded.url) {
            Ok(audio_id) => FileOutcome::Placed {
                file: file.name.clone(),
                overlays: vec![video_id, audio_id],
            },
            Err(err) => FileOutcome::CompanionAudioFailed {
                file: file.name.clone(),
                video: video_id,
                reason: MediaError::CompanionPlacement(err.to_string()).to_string(),
            },
        }
    }

    fn place_video_overlay(
        &mut self,
        uploaded: &UploadedMedia,
        duration: TimeMs,
        has_audio: bool,
    ) -> Result<(Uuid, TimeMs)> {
        let row = self.tracks.dedicated_row(OverlayKind::Video, self.timeline)?;
        let start = self.timeline.last_end_for_kind(OverlayKind::Video);
        let mut overlay =
            Overlay::new(OverlayKind::Video, row, start, duration, uploaded.url.clone());
        overlay.has_separate_audio = has_audio;
        let id = self.timeline.add_overlay(overlay)?;
        Ok((id, start))
    }

    fn place_companion_audio(&mut self, start: TimeMs, duration: TimeMs, url: &str) -> Result<Uuid> {
        let row = self.tracks.audio_row_for_video(self.timeline)?;
        let overlay = Overlay::new(OverlayKind::Audio, row, start, duration, url);
        Ok(self.timeline.add_overlay(overlay)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
