use crate::types::TimeMs;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RulerMarker
// ---------------------------------------------------------------------------

/// One tick on the time ruler. Derived, never mutated in place; the whole
/// sequence is recomputed whenever duration, fps or zoom change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RulerMarker {
    pub time_s: f64,
    pub position_pct: f64,
    pub is_major: bool,
    pub is_minor: bool,
    pub is_frame: bool,
    pub frame: Option<u64>,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interval {
    Frames(u64),
    Seconds(u64),
}

/// Tick spacing for a zoom level. Frame spacing at high zoom widens with
/// high frame rates so ticks never pack tighter than 0.1s/0.2s worth of
/// frames.
fn interval_for(scale: f64, fps: f64) -> Interval {
    if scale >= 30.0 {
        Interval::Frames(1)
    } else if scale >= 20.0 {
        Interval::Frames(5u64.max((0.1 * fps).round() as u64))
    } else if scale >= 15.0 {
        Interval::Frames(10u64.max((0.2 * fps).round() as u64))
    } else if scale >= 10.0 {
        Interval::Seconds(1)
    } else if scale >= 5.0 {
        Interval::Seconds(5)
    } else if scale >= 2.0 {
        Interval::Seconds(10)
    } else if scale >= 1.0 {
        Interval::Seconds(30)
    } else {
        Interval::Seconds(60)
    }
}

fn label_for(scale: f64, frame: Option<u64>, time_s: f64) -> String {
    if scale >= 30.0 {
        frame.map(|f| f.to_string()).unwrap_or_default()
    } else if scale >= 20.0 {
        format!("{time_s:.2}")
    } else if scale >= 15.0 {
        frame.map(|f| f.to_string()).unwrap_or_default()
    } else {
        let total = time_s.round() as i64;
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Generate the ordered marker sequence for a timeline of `max_time` at
/// `fps`, zoomed to `scale`. Pure: identical inputs yield identical output.
pub fn generate(max_time: TimeMs, fps: f64, scale: f64) -> Vec<RulerMarker> {
    if max_time.0 <= 0 {
        return vec![];
    }
    let max_ms = max_time.0 as f64;
    let max_s = max_ms / 1_000.0;

    match interval_for(scale, fps) {
        Interval::Frames(step) => {
            if fps <= 0.0 {
                return vec![];
            }
            let total_frames = (max_s * fps).ceil() as u64;
            let frames_per_second = (fps.round() as u64).max(1);
            let minor_every = (frames_per_second / 3).max(1);

            let mut markers = vec![];
            let mut frame = 0u64;
            while frame <= total_frames {
                let time_s = frame as f64 / fps;
                let is_major = frame % frames_per_second == 0;
                markers.push(RulerMarker {
                    time_s,
                    position_pct: (time_s * 1_000.0 / max_ms) * 100.0,
                    is_major,
                    is_minor: !is_major && frame % minor_every == 0,
                    is_frame: true,
                    frame: Some(frame),
                    label: label_for(scale, Some(frame), time_s),
                });
                frame += step;
            }
            markers
        }
        Interval::Seconds(step) => {
            let mut markers = vec![];
            let mut tick = 0u64;
            loop {
                let time_s = (tick * step) as f64;
                if time_s > max_s {
                    break;
                }
                let is_major = tick % 5 == 0;
                markers.push(RulerMarker {
                    time_s,
                    position_pct: (time_s * 1_000.0 / max_ms) * 100.0,
                    is_major,
                    is_minor: !is_major,
                    is_frame: false,
                    frame: None,
                    label: label_for(scale, None, time_s),
                });
                tick += 1;
            }
            markers
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_and_deterministic() {
        let a = generate(TimeMs(90_000), 30.0, 7.0);
        let b = generate(TimeMs(90_000), 30.0, 7.0);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn one_minute_at_scale_one() {
        let markers = generate(TimeMs(60_000), 30.0, 1.0);
        let times: Vec<f64> = markers.iter().map(|m| m.time_s).collect();
        let positions: Vec<f64> = markers.iter().map(|m| m.position_pct).collect();
        assert_eq!(times, vec![0.0, 30.0, 60.0]);
        assert_eq!(positions, vec![0.0, 50.0, 100.0]);
        assert!(markers.iter().all(|m| !m.is_frame && m.frame.is_none()));
    }

    #[test]
    fn every_frame_at_deep_zoom() {
        let markers = generate(TimeMs(1_000), 30.0, 40.0);
        // Frames 0..=30 inclusive.
        assert_eq!(markers.len(), 31);
        assert!(markers.iter().all(|m| m.is_frame));
        assert_eq!(markers[0].frame, Some(0));
        assert_eq!(markers[30].frame, Some(30));
        assert_eq!(markers[30].label, "30");
    }

    #[test]
    fn frame_major_every_second_minor_every_third() {
        let markers = generate(TimeMs(2_000), 30.0, 40.0);
        let major: Vec<u64> = markers
            .iter()
            .filter(|m| m.is_major)
            .map(|m| m.frame.unwrap())
            .collect();
        assert_eq!(major, vec![0, 30, 60]);

        let minor: Vec<u64> = markers
            .iter()
            .filter(|m| m.is_minor)
            .map(|m| m.frame.unwrap())
            .collect();
        // Every 10 frames (30/3) that is not a full second.
        assert_eq!(minor, vec![10, 20, 40, 50]);
    }

    #[test]
    fn five_frame_band_widens_for_high_fps() {
        let markers = generate(TimeMs(1_000), 30.0, 25.0);
        assert_eq!(markers[1].frame, Some(5));

        // 0.1s at 120fps is 12 frames, coarser than 5.
        let markers = generate(TimeMs(1_000), 120.0, 25.0);
        assert_eq!(markers[1].frame, Some(12));
    }

    #[test]
    fn ten_frame_band_uses_frame_labels() {
        let markers = generate(TimeMs(1_000), 30.0, 16.0);
        assert_eq!(markers[1].frame, Some(10));
        assert_eq!(markers[1].label, "10");
    }

    #[test]
    fn centisecond_labels_in_five_frame_band() {
        let markers = generate(TimeMs(1_000), 30.0, 25.0);
        // Frame 5 at 30fps is 0.1667s.
        assert_eq!(markers[1].label, "0.17");
    }

    #[test]
    fn one_second_band_major_every_five() {
        let markers = generate(TimeMs(12_000), 30.0, 12.0);
        let times: Vec<f64> = markers.iter().map(|m| m.time_s).collect();
        assert_eq!(times, (0..=12).map(|t| t as f64).collect::<Vec<_>>());
        let major: Vec<f64> = markers
            .iter()
            .filter(|m| m.is_major)
            .map(|m| m.time_s)
            .collect();
        assert_eq!(major, vec![0.0, 5.0, 10.0]);
        assert_eq!(markers[1].label, "0:01");
    }

    #[test]
    fn minute_second_labels_when_zoomed_out() {
        let markers = generate(TimeMs(300_000), 30.0, 0.5);
        assert_eq!(markers[1].time_s, 60.0);
        assert_eq!(markers[1].label, "1:00");
        assert_eq!(markers[2].label, "2:00");
    }

    #[test]
    fn interval_bands() {
        assert_eq!(interval_for(31.0, 30.0), Interval::Frames(1));
        assert_eq!(interval_for(21.0, 30.0), Interval::Frames(5));
        assert_eq!(interval_for(16.0, 30.0), Interval::Frames(10));
        assert_eq!(interval_for(11.0, 30.0), Interval::Seconds(1));
        assert_eq!(interval_for(6.0, 30.0), Interval::Seconds(5));
        assert_eq!(interval_for(3.0, 30.0), Interval::Seconds(10));
        assert_eq!(interval_for(1.5, 30.0), Interval::Seconds(30));
        assert_eq!(interval_for(0.5, 30.0), Interval::Seconds(60));
    }

    #[test]
    fn degenerate_inputs_yield_nothing() {
        assert!(generate(TimeMs(0), 30.0, 10.0).is_empty());
        assert!(generate(TimeMs(-5), 30.0, 10.0).is_empty());
        assert!(generate(TimeMs(1_000), 0.0, 40.0).is_empty());
    }
}
