use crate::ghost::GhostElement;
use crate::types::Timeline;
use serde::{Deserialize, Serialize};

/// Default alignment threshold, in percent of timeline width.
pub const DEFAULT_THRESHOLD_PCT: f64 = 1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlignmentKind {
    StartToStart,
    StartToEnd,
    EndToStart,
    EndToEnd,
}

impl AlignmentKind {
    /// Does this alignment anchor the ghost's left edge (as opposed to its
    /// right edge)?
    fn is_left_edge(&self) -> bool {
        matches!(self, Self::StartToStart | Self::StartToEnd)
    }
}

/// A guide line to render while a ghost is active. Ephemeral: recomputed on
/// every pointer move, cleared on reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignmentLine {
    pub position_pct: f64,
    pub kind: AlignmentKind,
    pub snap_guide: bool,
}

/// Compare the ghost's edges against every other overlay's edges and emit a
/// line for each pairing within the threshold. The single nearest candidate
/// per ghost edge is flagged as the snap guide.
pub fn compute(ghost: &GhostElement, timeline: &Timeline, threshold_pct: f64) -> Vec<AlignmentLine> {
    if timeline.max_time.0 <= 0 {
        return vec![];
    }
    let max_ms = timeline.max_time.0 as f64;
    let ghost_left = ghost.left_pct;
    let ghost_right = ghost.left_pct + ghost.width_pct;

    let mut candidates: Vec<(AlignmentKind, f64, f64)> = vec![];
    for overlay in &timeline.overlays {
        if ghost.source == Some(overlay.id) {
            continue;
        }
        let start_pct = overlay.start.0 as f64 / max_ms * 100.0;
        let end_pct = overlay.end().0 as f64 / max_ms * 100.0;

        let pairings = [
            (AlignmentKind::StartToStart, start_pct, (ghost_left - start_pct).abs()),
            (AlignmentKind::StartToEnd, end_pct, (ghost_left - end_pct).abs()),
            (AlignmentKind::EndToStart, start_pct, (ghost_right - start_pct).abs()),
            (AlignmentKind::EndToEnd, end_pct, (ghost_right - end_pct).abs()),
        ];
        for (kind, position, distance) in pairings {
            if distance <= threshold_pct {
                candidates.push((kind, position, distance));
            }
        }
    }

    let nearest_for = |left_edge: bool| -> Option<usize> {
        candidates
            .iter()
            .enumerate()
            .filter(|(_, (kind, _, _))| kind.is_left_edge() == left_edge)
            .min_by(|(_, a), (_, b)| a.2.total_cmp(&b.2))
            .map(|(i, _)| i)
    };
    let snap_left = nearest_for(true);
    let snap_right = nearest_for(false);

    let mut lines: Vec<AlignmentLine> = candidates
        .iter()
        .enumerate()
        .map(|(i, (kind, position, _))| AlignmentLine {
            position_pct: *position,
            kind: *kind,
            snap_guide: Some(i) == snap_left || Some(i) == snap_right,
        })
        .collect();
    lines.sort_by(|a, b| a.position_pct.total_cmp(&b.position_pct));
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
