use crate::types::{OverlayKind, Timeline};

/// Can two overlay kinds share a track? Symmetric and total.
///
/// Text tracks hold only text. Animation overlays are motion graphics and
/// may sit anywhere. Video, audio and image each get a dedicated lane so
/// trims and splits never visually collide across different media; only
/// images may stack with more images.
pub fn compatible(a: OverlayKind, b: OverlayKind) -> bool {
    use OverlayKind::*;
    match (a, b) {
        (Animation, _) | (_, Animation) => true,
        (Text, Text) => true,
        (Text, _) | (_, Text) => false,
        (Image, Image) => true,
        _ => false,
    }
}

/// Would a row accept an overlay of `kind`, given its current occupants?
/// An empty row accepts anything.
pub fn row_accepts(timeline: &Timeline, row: u32, kind: OverlayKind) -> bool {
    timeline.row_kinds(row).iter().all(|&k| compatible(k, kind))
}
