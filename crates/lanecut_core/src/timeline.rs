use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

impl Timeline {
    /// Create a timeline with an initial track count, project duration and
    /// frame rate.
    pub fn new(max_rows: u32, max_time: TimeMs, fps: f64) -> Self {
        Self {
            overlays: vec![],
            max_rows,
            max_time,
            fps,
            revision: 0,
        }
    }

    /// Add an overlay. The target row must already exist; callers that may
    /// place on a fresh row go through `extend_rows` (or the track
    /// allocator, which does it for them) first.
    pub fn add_overlay(&mut self, overlay: Overlay) -> Result<Uuid> {
        if overlay.row >= self.max_rows {
            return Err(CoreError::RowOutOfBounds(overlay.row, self.max_rows));
        }
        let id = overlay.id;
        self.overlays.push(overlay);
        self.revision += 1;
        Ok(id)
    }

    /// Remove an overlay by id. Returns the removed overlay.
    pub fn remove_overlay(&mut self, id: Uuid) -> Result<Overlay> {
        let pos = self
            .overlays
            .iter()
            .position(|o| o.id == id)
            .ok_or(CoreError::OverlayNotFound(id))?;
        self.revision += 1;
        Ok(self.overlays.remove(pos))
    }

    pub fn find(&self, id: Uuid) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Grow the track count so that `row` exists. Row space is append-only;
    /// a request below the current count is a no-op.
    pub fn extend_rows(&mut self, row: u32) {
        if row >= self.max_rows {
            self.max_rows = row + 1;
            self.revision += 1;
        }
    }

    pub fn overlays_on_row(&self, row: u32) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter().filter(move |o| o.row == row)
    }

    /// Distinct overlay kinds currently occupying a row.
    pub fn row_kinds(&self, row: u32) -> Vec<OverlayKind> {
        let mut kinds = vec![];
        for overlay in self.overlays_on_row(row) {
            if !kinds.contains(&overlay.kind) {
                kinds.push(overlay.kind);
            }
        }
        kinds
    }

    /// End time of the last overlay of `kind` anywhere on the timeline.
    /// Zero when none exist. This is the "end-bar" used for append
    /// placement of video and audio.
    pub fn last_end_for_kind(&self, kind: OverlayKind) -> TimeMs {
        self.overlays
            .iter()
            .filter(|o| o.kind == kind)
            .map(|o| o.end())
            .max()
            .unwrap_or(TimeMs::ZERO)
    }

    /// End time of the last overlay on a specific row. Zero when the row is
    /// empty. Used for sequential image appends.
    pub fn last_end_on_row(&self, row: u32) -> TimeMs {
        self.overlays_on_row(row)
            .map(|o| o.end())
            .max()
            .unwrap_or(TimeMs::ZERO)
    }

    /// Notify the timeline that a batch mutation finished so derived views
    /// can recompute. Bumps the revision even when no overlay changed.
    pub fn refresh(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline::new(3, TimeMs(60_000), 30.0)
    }

    #[test]
    fn add_and_remove_overlay() {
        let mut tl = timeline();
        let o = Overlay::new(OverlayKind::Video, 0, TimeMs(0), TimeMs(5_000), "v.mp4");
        let id = tl.add_overlay(o.clone()).unwrap();
        assert_eq!(id, o.id);
        assert_eq!(tl.find(id), Some(&o));

        let removed = tl.remove_overlay(id).unwrap();
        assert_eq!(removed, o);
        assert!(tl.find(id).is_none());
    }

    #[test]
    fn add_out_of_bounds_row_fails() {
        let mut tl = timeline();
        let o = Overlay::new(OverlayKind::Video, 3, TimeMs(0), TimeMs(5_000), "v.mp4");
        assert!(matches!(
            tl.add_overlay(o),
            Err(CoreError::RowOutOfBounds(3, 3))
        ));
    }

    #[test]
    fn remove_missing_overlay_fails() {
        let mut tl = timeline();
        let id = uuid::Uuid::new_v4();
        assert!(matches!(
            tl.remove_overlay(id),
            Err(CoreError::OverlayNotFound(e)) if e == id
        ));
    }

    #[test]
    fn extend_rows_grows_only() {
        let mut tl = timeline();
        tl.extend_rows(5);
        assert_eq!(tl.max_rows, 6);
        tl.extend_rows(1);
        assert_eq!(tl.max_rows, 6);
    }

    #[test]
    fn row_kinds_dedup() {
        let mut tl = timeline();
        tl.add_overlay(Overlay::new(OverlayKind::Image, 1, TimeMs(0), TimeMs(4_000), "a.png"))
            .unwrap();
        tl.add_overlay(Overlay::new(OverlayKind::Image, 1, TimeMs(4_000), TimeMs(4_000), "b.png"))
            .unwrap();
        tl.add_overlay(Overlay::new(OverlayKind::Animation, 1, TimeMs(0), TimeMs(2_000), "c"))
            .unwrap();
        assert_eq!(tl.row_kinds(1), vec![OverlayKind::Image, OverlayKind::Animation]);
        assert!(tl.row_kinds(2).is_empty());
    }

    #[test]
    fn last_end_for_kind_picks_latest() {
        let mut tl = timeline();
        tl.add_overlay(Overlay::new(OverlayKind::Video, 0, TimeMs(0), TimeMs(5_000), "a.mp4"))
            .unwrap();
        tl.add_overlay(Overlay::new(OverlayKind::Video, 0, TimeMs(5_000), TimeMs(3_000), "b.mp4"))
            .unwrap();
        assert_eq!(tl.last_end_for_kind(OverlayKind::Video), TimeMs(8_000));
        assert_eq!(tl.last_end_for_kind(OverlayKind::Audio), TimeMs::ZERO);
    }

    #[test]
    fn last_end_on_row_ignores_other_rows() {
        let mut tl = timeline();
        tl.add_overlay(Overlay::new(OverlayKind::Image, 1, TimeMs(0), TimeMs(4_000), "a.png"))
            .unwrap();
        tl.add_overlay(Overlay::new(OverlayKind::Video, 0, TimeMs(0), TimeMs(9_000), "v.mp4"))
            .unwrap();
        assert_eq!(tl.last_end_on_row(1), TimeMs(4_000));
        assert_eq!(tl.last_end_on_row(2), TimeMs::ZERO);
    }

    #[test]
    fn revision_bumps_on_mutation() {
        let mut tl = timeline();
        let r0 = tl.revision;
        tl.add_overlay(Overlay::new(OverlayKind::Video, 0, TimeMs(0), TimeMs(1_000), "v"))
            .unwrap();
        assert!(tl.revision > r0);
        let r1 = tl.revision;
        tl.refresh();
        assert!(tl.revision > r1);
    }
}
