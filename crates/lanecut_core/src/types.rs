use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TimeMs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub const ZERO: Self = Self(0);

    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1_000.0) as i64)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

impl Add for TimeMs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeMs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<i64> for TimeMs {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self(self.0 * rhs)
    }
}

impl Div<i64> for TimeMs {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = self.0.unsigned_abs();
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

// ---------------------------------------------------------------------------
// OverlayKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Video,
    Audio,
    Image,
    Text,
    Animation,
}

impl OverlayKind {
    /// Kinds the track allocator reserves dedicated rows for. Text and
    /// animation overlays are placed directly by the user.
    pub fn is_allocatable(&self) -> bool {
        matches!(self, Self::Video | Self::Audio | Self::Image)
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Text => "text",
            Self::Animation => "animation",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Overlay {
    pub id: Uuid,
    pub kind: OverlayKind,
    pub row: u32,
    pub start: TimeMs,
    pub duration: TimeMs,
    pub src: String,
    pub has_separate_audio: bool,
}

impl Overlay {
    pub fn new(kind: OverlayKind, row: u32, start: TimeMs, duration: TimeMs, src: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            row,
            start,
            duration,
            src: src.into(),
            has_separate_audio: false,
        }
    }

    pub fn end(&self) -> TimeMs {
        self.start + self.duration
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// The in-memory overlay store: a flat collection of overlays indexed into
/// an unbounded, append-only row space. `max_rows` only ever grows during a
/// session. `revision` is bumped on every mutation so renderers can detect
/// that their derived view is stale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub overlays: Vec<Overlay>,
    pub max_rows: u32,
    pub max_time: TimeMs,
    pub fps: f64,
    pub revision: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
