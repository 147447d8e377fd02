//! Segment coloring and run packing.
//!
//! Each placed segment gets a color from the color scale, is marked filled or
//! not against the pointer's end ratio, and non-filled segments go through
//! the dimmer. Segments with equal final colors are batched into runs so each
//! distinct color costs one path.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::color::{Color, ColorKey};
use crate::color_scale::ColorScale;
use crate::geometry::{Rect, SegmentBox};
use crate::scale::Scale;

// ============================================================================
// DIMMER
// ============================================================================

/// Replacement color for segments outside the indicated range.
pub enum Dimmer {
    Literal(Option<Color>),
    Transform(Box<dyn Fn(Option<Color>) -> Option<Color>>),
}

impl Dimmer {
    pub fn transform(f: impl Fn(Option<Color>) -> Option<Color> + 'static) -> Self {
        Dimmer::Transform(Box::new(f))
    }

    /// Darkens the base color by `factor`; "none" stays "none".
    pub fn darken(factor: f64) -> Self {
        Dimmer::transform(move |color| color.map(|c| c.darken(factor)))
    }

    pub fn apply(&self, color: Option<Color>) -> Option<Color> {
        match self {
            Dimmer::Literal(literal) => *literal,
            Dimmer::Transform(f) => f(color),
        }
    }

    /// The persistable form; function dimmers have none.
    pub fn literal(&self) -> Option<Option<Color>> {
        match self {
            Dimmer::Literal(color) => Some(*color),
            Dimmer::Transform(_) => None,
        }
    }
}

impl Default for Dimmer {
    fn default() -> Self {
        Dimmer::darken(0.6)
    }
}

impl fmt::Debug for Dimmer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimmer::Literal(color) => f.debug_tuple("Literal").field(color).finish(),
            Dimmer::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

// ============================================================================
// SEGMENTS
// ============================================================================

/// A placed segment with its resolved color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub rect: Rect,
    pub start: f64,
    pub end: f64,
    pub start_ratio: f64,
    pub end_ratio: f64,
    /// Data value at the segment's far edge.
    pub value: f64,
    /// Color scale output before dimming.
    pub base_color: Option<Color>,
    /// Final color; `None` renders as "none".
    pub color: Option<Color>,
    pub key: ColorKey,
    pub filled: bool,
}

/// Filled test against the pointer's end ratio. Non-inverted scales compare
/// the near edge, inverted ones the far edge.
pub fn is_filled(start_ratio: f64, end_ratio: f64, pointer_ratio: f64, inverted: bool) -> bool {
    if inverted {
        end_ratio <= pointer_ratio
    } else {
        start_ratio >= pointer_ratio
    }
}

/// Resolves value, color and fill state for every placed segment.
pub fn color_segments(
    boxes: &[SegmentBox],
    scale: &dyn Scale,
    color_scale: &dyn ColorScale,
    dimmer: &Dimmer,
    pointer_ratio: f64,
) -> Vec<Segment> {
    let inverted = scale.inverted();
    boxes
        .iter()
        .map(|b| {
            let value = scale.inverse_transform(b.end_ratio);
            let base_color = color_scale.value_to_color(value);
            let filled = is_filled(b.start_ratio, b.end_ratio, pointer_ratio, inverted);
            let color = if filled {
                base_color
            } else {
                dimmer.apply(base_color)
            };
            Segment {
                index: b.index,
                rect: b.rect,
                start: b.start,
                end: b.end,
                start_ratio: b.start_ratio,
                end_ratio: b.end_ratio,
                value,
                base_color,
                color,
                key: ColorKey::of(color),
                filled,
            }
        })
        .collect()
}

// ============================================================================
// RUNS
// ============================================================================

/// Segments sharing one final color, in placement order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub key: ColorKey,
    pub color: Option<Color>,
    pub segments: Vec<usize>,
    /// Number of separate contiguous groups folded into this run.
    pub groups: usize,
}

/// Packs segments into runs, one per distinct color key, ordered by first
/// appearance. A color that comes back after a different one rejoins its
/// earlier run.
pub fn pack_runs(segments: &[Segment]) -> Vec<RunPlan> {
    let mut runs: Vec<RunPlan> = Vec::new();
    let mut by_key: FxHashMap<ColorKey, usize> = FxHashMap::default();
    let mut active: Option<(ColorKey, usize)> = None;

    for (position, segment) in segments.iter().enumerate() {
        let run = match active {
            Some((key, run)) if key == segment.key => run,
            _ => {
                let run = *by_key.entry(segment.key).or_insert_with(|| {
                    runs.push(RunPlan {
                        key: segment.key,
                        color: segment.color,
                        segments: Vec::new(),
                        groups: 0,
                    });
                    runs.len() - 1
                });
                runs[run].groups += 1;
                active = Some((segment.key, run));
                run
            }
        };
        runs[run].segments.push(position);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::{ColorRange, OrdinalColorScale};
    use crate::geometry::{place_segments, Orientation, SegmentPlan, Track};
    use crate::scale::LinearScale;

    const A: Color = Color::new(10, 20, 30);
    const B: Color = Color::new(200, 0, 0);

    fn segment(index: usize, color: Option<Color>) -> Segment {
        Segment {
            index,
            rect: Rect::new(0.0, index as f64 * 10.0, 5.0, 8.0),
            start: 0.0,
            end: 0.0,
            start_ratio: 0.0,
            end_ratio: 0.0,
            value: 0.0,
            base_color: color,
            color,
            key: ColorKey::of(color),
            filled: true,
        }
    }

    #[test]
    fn returning_color_rejoins_first_run() {
        let segments = [segment(0, Some(A)), segment(1, Some(B)), segment(2, Some(A))];
        let runs = pack_runs(&segments);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].color, Some(A));
        assert_eq!(runs[0].segments, vec![0, 2]);
        assert_eq!(runs[0].groups, 2);
        assert_eq!(runs[1].segments, vec![1]);
    }

    #[test]
    fn adjacent_equal_colors_share_a_group() {
        let segments = [segment(0, None), segment(1, None), segment(2, Some(B))];
        let runs = pack_runs(&segments);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].key, ColorKey::None);
        assert_eq!(runs[0].groups, 1);
        assert_eq!(runs[0].segments, vec![0, 1]);
    }

    #[test]
    fn filled_boundary_is_inclusive() {
        assert!(is_filled(0.5, 0.6, 0.5, false));
        assert!(!is_filled(0.4999999, 0.6, 0.5, false));
        assert!(is_filled(0.3, 0.5, 0.5, true));
        assert!(!is_filled(0.3, 0.5000001, 0.5, true));
    }

    #[test]
    fn dimmer_variants() {
        assert_eq!(Dimmer::Literal(Some(B)).apply(Some(A)), Some(B));
        assert_eq!(Dimmer::Literal(None).apply(Some(A)), None);
        assert_eq!(Dimmer::darken(0.5).apply(None), None);
        assert_eq!(Dimmer::transform(|_| Some(A)).apply(None), Some(A));
        assert!(Dimmer::default().literal().is_none());
    }

    #[test]
    fn colors_follow_scale_and_dimmer() {
        let track = Track::new(Rect::new(0.0, 0.0, 10.0, 100.0), Orientation::Vertical);
        let boxes = place_segments(&track, &SegmentPlan { count: 4, size: 25.0, gap: 0.0 });
        let scale = LinearScale::new(0.0, 100.0);
        let colors = OrdinalColorScale::new(vec![
            ColorRange::new(None, Some(50.0), Some(A)),
            ColorRange::new(Some(50.0), None, Some(B)),
        ]);
        let gray = Color::new(90, 90, 90);
        let segments = color_segments(&boxes, &scale, &colors, &Dimmer::Literal(Some(gray)), 0.5);

        let values: Vec<f64> = segments.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![25.0, 50.0, 75.0, 100.0]);
        let filled: Vec<bool> = segments.iter().map(|s| s.filled).collect();
        assert_eq!(filled, vec![false, false, true, true]);
        assert_eq!(segments[0].color, Some(gray));
        assert_eq!(segments[0].base_color, Some(A));
        assert_eq!(segments[2].color, Some(B));
        assert_eq!(segments[2].key, ColorKey::of(Some(B)));
    }
}
