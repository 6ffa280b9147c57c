use crate::align::{self, AlignmentLine};
use crate::compat::row_accepts;
use crate::types::{OverlayKind, Timeline};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resize ghost never collapses below this width.
pub const MIN_GHOST_WIDTH_PCT: f64 = 0.5;

// ---------------------------------------------------------------------------
// Pointer geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

/// The timeline's interactive bounding box in screen coordinates, used to
/// translate pointer positions into (percent-of-duration, row) pairs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimelineBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub row_height: f64,
}

impl TimelineBounds {
    pub fn position_pct(&self, x: f64) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        ((x - self.left) / self.width * 100.0).clamp(0.0, 100.0)
    }

    pub fn row_at(&self, y: f64, max_rows: u32) -> u32 {
        if self.row_height <= 0.0 || max_rows == 0 {
            return 0;
        }
        let row = ((y - self.top) / self.row_height).floor();
        (row.max(0.0) as u32).min(max_rows - 1)
    }
}

// ---------------------------------------------------------------------------
// Ghost payloads
// ---------------------------------------------------------------------------

/// Geometry of the element being previewed: horizontal position and width
/// as percent of total duration, plus the hovered row. `source` is the
/// timeline overlay being moved, when there is one (internal drags).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GhostElement {
    pub left_pct: f64,
    pub width_pct: f64,
    pub row: u32,
    pub kind: OverlayKind,
    pub source: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResizeGhost {
    pub element: GhostElement,
    pub edge: ResizeEdge,
    /// Whether the resize may displace neighboring overlays.
    pub can_push: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileGhost {
    pub element: GhostElement,
    /// The hovered row holds a kind the dragged file cannot share a track
    /// with.
    pub is_incompatible: bool,
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

/// The active interaction. At most one variant is live at a time by
/// construction; every `begin_*` transition goes through a full reset
/// first, so a mixed state cannot be assembled.
///
/// `Dragging(None)` / `MultiDragging(vec![])` are the "payload cleared,
/// mode retained" states entered when the pointer leaves the timeline
/// bounds mid-drag: the drag is still conceptually in progress and may
/// resume when the pointer re-enters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Dragging(Option<GhostElement>),
    Resizing(ResizeGhost),
    MultiDragging(Vec<GhostElement>),
    GalleryDragging(GhostElement),
    FileDragging(FileGhost),
}

// ---------------------------------------------------------------------------
// GhostState
// ---------------------------------------------------------------------------

/// Session-scoped interaction state. Renderers read immutable snapshots;
/// all mutation goes through the named transitions below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GhostState {
    interaction: Interaction,
    alignment_lines: Vec<AlignmentLine>,
    marker_position_pct: Option<f64>,
}

impl GhostState {
    pub fn new() -> Self {
        Self::default()
    }

    // -- reads ---------------------------------------------------------

    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn alignment_lines(&self) -> &[AlignmentLine] {
        &self.alignment_lines
    }

    pub fn marker_position_pct(&self) -> Option<f64> {
        self.marker_position_pct
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.interaction, Interaction::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging(_))
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.interaction, Interaction::Resizing(_))
    }

    pub fn is_multi_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::MultiDragging(_))
    }

    pub fn is_gallery_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::GalleryDragging(_))
    }

    pub fn is_file_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::FileDragging(_))
    }

    pub fn file_ghost(&self) -> Option<&FileGhost> {
        match &self.interaction {
            Interaction::FileDragging(ghost) => Some(ghost),
            _ => None,
        }
    }

    // -- transitions ---------------------------------------------------

    pub fn begin_drag(&mut self, element: GhostElement) {
        self.reset();
        self.interaction = Interaction::Dragging(Some(element));
    }

    pub fn begin_resize(&mut self, element: GhostElement, edge: ResizeEdge, can_push: bool) {
        self.reset();
        self.interaction = Interaction::Resizing(ResizeGhost {
            element,
            edge,
            can_push,
        });
    }

    pub fn begin_multi_drag(&mut self, elements: Vec<GhostElement>) {
        self.reset();
        self.interaction = Interaction::MultiDragging(elements);
    }

    pub fn begin_gallery_drag(&mut self, element: GhostElement) {
        self.reset();
        self.interaction = Interaction::GalleryDragging(element);
    }

    pub fn begin_file_drag(&mut self, kind: OverlayKind, width_pct: f64) {
        self.reset();
        self.interaction = Interaction::FileDragging(FileGhost {
            element: GhostElement {
                left_pct: 0.0,
                width_pct,
                row: 0,
                kind,
                source: None,
            },
            is_incompatible: false,
        });
    }

    /// Recompute the active ghost's geometry from the pointer position,
    /// re-evaluate file-drag compatibility against the hovered row, and
    /// refresh the alignment lines. No-op while idle or payload-cleared.
    pub fn pointer_moved(&mut self, event: PointerEvent, bounds: &TimelineBounds, timeline: &Timeline) {
        let pointer_pct = bounds.position_pct(event.x);
        let row = bounds.row_at(event.y, timeline.max_rows);

        match &mut self.interaction {
            Interaction::Idle | Interaction::Dragging(None) => {}
            Interaction::Dragging(Some(element)) => {
                place(element, pointer_pct, row);
            }
            Interaction::Resizing(ghost) => {
                resize(&mut ghost.element, ghost.edge, pointer_pct);
            }
            Interaction::MultiDragging(elements) => {
                shift_group(elements, pointer_pct);
            }
            Interaction::GalleryDragging(element) => {
                place(element, pointer_pct, row);
            }
            Interaction::FileDragging(ghost) => {
                place(&mut ghost.element, pointer_pct, row);
                ghost.is_incompatible = !row_accepts(timeline, row, ghost.element.kind);
            }
        }

        let lines = match self.active_ghost() {
            Some(ghost) => align::compute(ghost, timeline, align::DEFAULT_THRESHOLD_PCT),
            None => vec![],
        };
        self.alignment_lines = lines;
    }

    /// The pointer left the timeline's interactive bounds.
    ///
    /// File and gallery drags originate outside the timeline and have no
    /// resumption semantics, so they fully reset. Internal drags keep
    /// their mode flag as a resume hint and only drop the payload. A
    /// resize captures the pointer, so its ghost is left untouched.
    pub fn bounds_left(&mut self) {
        match &mut self.interaction {
            Interaction::FileDragging(_) | Interaction::GalleryDragging(_) => self.reset(),
            Interaction::Dragging(payload) => {
                *payload = None;
                self.alignment_lines.clear();
            }
            Interaction::MultiDragging(elements) => {
                elements.clear();
                self.alignment_lines.clear();
            }
            Interaction::Idle | Interaction::Resizing(_) => {}
        }
    }

    /// A drop ended the interaction, successfully or not.
    pub fn dropped(&mut self) {
        self.reset();
    }

    /// Full reset: interaction to idle, alignment lines emptied. The hover
    /// marker is independent of drag mode and survives. Idempotent.
    pub fn reset(&mut self) {
        self.interaction = Interaction::Idle;
        self.alignment_lines.clear();
    }

    pub fn set_marker_position(&mut self, pct: f64) {
        self.marker_position_pct = Some(pct);
    }

    pub fn clear_marker(&mut self) {
        self.marker_position_pct = None;
    }

    /// The ghost that alignment lines are derived from; the first element
    /// for a multi-drag.
    fn active_ghost(&self) -> Option<&GhostElement> {
        match &self.interaction {
            Interaction::Idle | Interaction::Dragging(None) => None,
            Interaction::Dragging(Some(element)) => Some(element),
            Interaction::Resizing(ghost) => Some(&ghost.element),
            Interaction::MultiDragging(elements) => elements.first(),
            Interaction::GalleryDragging(element) => Some(element),
            Interaction::FileDragging(ghost) => Some(&ghost.element),
        }
    }
}

/// Move a ghost so its left edge tracks the pointer, kept inside the
/// timeline.
fn place(element: &mut GhostElement, pointer_pct: f64, row: u32) {
    let max_left = (100.0 - element.width_pct).max(0.0);
    element.left_pct = pointer_pct.min(max_left);
    element.row = row;
}

/// Drag one edge of a ghost; the opposite edge stays fixed.
fn resize(element: &mut GhostElement, edge: ResizeEdge, pointer_pct: f64) {
    match edge {
        ResizeEdge::Left => {
            let right = element.left_pct + element.width_pct;
            let new_left = pointer_pct.min(right - MIN_GHOST_WIDTH_PCT).max(0.0);
            element.left_pct = new_left;
            element.width_pct = right - new_left;
        }
        ResizeEdge::Right => {
            element.width_pct = (pointer_pct - element.left_pct).max(MIN_GHOST_WIDTH_PCT);
        }
    }
}

/// Shift every element of a multi-selection by the pointer delta against
/// the first element, clamped so the whole group stays inside the
/// timeline. Rows are preserved.
fn shift_group(elements: &mut [GhostElement], pointer_pct: f64) {
    let Some(primary) = elements.first() else {
        return;
    };
    let min_left = elements
        .iter()
        .map(|e| e.left_pct)
        .fold(f64::INFINITY, f64::min);
    let max_right = elements
        .iter()
        .map(|e| e.left_pct + e.width_pct)
        .fold(f64::NEG_INFINITY, f64::max);

    let delta = (pointer_pct - primary.left_pct)
        .max(-min_left)
        .min(100.0 - max_right);
    for element in elements.iter_mut() {
        element.left_pct += delta;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
