use crate::compat::row_accepts;
use crate::error::{CoreError, Result};
use crate::types::{OverlayKind, Timeline};
use serde::{Deserialize, Serialize};

/// Assigns one dedicated row per media kind, remembered for the session.
///
/// The first request for a kind picks the lowest row that would accept it
/// (or a fresh row past the current track count); later requests reuse the
/// remembered row. Track count only grows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackAllocator {
    video_row: Option<u32>,
    audio_row: Option<u32>,
    image_row: Option<u32>,
}

impl TrackAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dedicated row for a media kind, allocating it on first use and
    /// extending the timeline's track count when the row is new.
    pub fn dedicated_row(&mut self, kind: OverlayKind, timeline: &mut Timeline) -> Result<u32> {
        let slot = match kind {
            OverlayKind::Video => &mut self.video_row,
            OverlayKind::Audio => &mut self.audio_row,
            OverlayKind::Image => &mut self.image_row,
            other => return Err(CoreError::KindNotAllocatable(other)),
        };

        if let Some(row) = *slot {
            return Ok(row);
        }

        let row = (0..timeline.max_rows)
            .find(|&r| row_accepts(timeline, r, kind))
            .unwrap_or(timeline.max_rows);
        timeline.extend_rows(row);
        *slot = Some(row);
        Ok(row)
    }

    /// The audio row to pair with an extracted video soundtrack. Guaranteed
    /// distinct from the video's dedicated row: on collision, audio is
    /// reassigned to `max(video_row + 1, current track count)`.
    pub fn audio_row_for_video(&mut self, timeline: &mut Timeline) -> Result<u32> {
        let video_row = self.dedicated_row(OverlayKind::Video, timeline)?;
        let audio_row = self.dedicated_row(OverlayKind::Audio, timeline)?;

        if audio_row != video_row {
            return Ok(audio_row);
        }

        let reassigned = (video_row + 1).max(timeline.max_rows);
        timeline.extend_rows(reassigned);
        self.audio_row = Some(reassigned);
        Ok(reassigned)
    }
}
