// ============================================================================
// TRACK GEOMETRY
// ============================================================================

use crate::constraint::{ConstraintState, Length};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Axis-aligned rectangle in surface coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

/// The rectangle the pointer occupies and the direction it fills in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Track {
    pub bounds: Rect,
    pub orientation: Orientation,
}

impl Track {
    pub const fn new(bounds: Rect, orientation: Orientation) -> Self {
        Self {
            bounds,
            orientation,
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    /// Extent along the fill axis.
    pub fn length(&self) -> f64 {
        if self.is_vertical() {
            self.bounds.height
        } else {
            self.bounds.width
        }
    }

    /// Fractional position of `bound` along the axis: 0 at the bottom (or
    /// left) edge, 1 at the top (or right), clamped and rounded to 7 digits.
    pub fn ratio_of(&self, bound: f64) -> f64 {
        let (min, range) = if self.is_vertical() {
            (self.bounds.bottom(), -self.bounds.height)
        } else {
            (self.bounds.left, self.bounds.width)
        };
        round7(((bound - min) / range).clamp(0.0, 1.0))
    }
}

pub fn round7(value: f64) -> f64 {
    (value * 1e7).round() / 1e7
}

// ============================================================================
// PLANNING
// ============================================================================

/// Segments thinner than half a pixel are not drawn; this also caps the
/// segment count at twice the track length.
pub const MIN_SEGMENT_SIZE: f64 = 0.5;

/// Fully resolved segment parameters for one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPlan {
    pub count: u32,
    pub size: f64,
    pub gap: f64,
}

impl SegmentPlan {
    /// Distance covered from the first segment's near edge to the last
    /// segment's far edge.
    pub fn span(&self) -> f64 {
        self.count as f64 * (self.size + self.gap) - self.gap
    }

    /// Derives the missing parameter from the two live ones. Returns `None`
    /// when fewer than two are set or the result would not be drawable.
    pub fn resolve(
        length: f64,
        gap: Option<Length>,
        size: Option<Length>,
        count: Option<u32>,
    ) -> Option<Self> {
        if !(length.is_finite() && length > 0.0) {
            return None;
        }
        let gap = gap.map(|g| g.resolve(length));
        let size = size.map(|s| s.resolve(length));

        let plan = match (gap, size, count) {
            (Some(gap), Some(size), _) => {
                let count = ((length + gap) / (size + gap)).floor();
                if !(count >= 1.0) || count > u32::MAX as f64 {
                    return None;
                }
                let slack = length - (count * (size + gap) - gap);
                let stretch = length / (length - slack);
                SegmentPlan {
                    count: count as u32,
                    size: size * stretch,
                    gap: gap * stretch,
                }
            }
            (Some(gap), None, Some(count)) => SegmentPlan {
                count,
                size: (length - (count as f64 - 1.0) * gap) / count as f64,
                gap,
            },
            (None, Some(size), Some(count)) => {
                let gap = if count == 1 {
                    0.0
                } else {
                    (length - count as f64 * size) / (count as f64 - 1.0)
                };
                SegmentPlan { count, size, gap }
            }
            _ => return None,
        };

        let drawable = plan.count > 0
            && plan.size.is_finite()
            && plan.size >= MIN_SEGMENT_SIZE
            && plan.gap.is_finite()
            && plan.gap >= 0.0;
        if !drawable {
            tracing::debug!(?plan, length, "led geometry not drawable");
            return None;
        }
        Some(plan)
    }

    /// Shortcut for the live pair held by `state`.
    pub fn for_state(length: f64, state: &ConstraintState) -> Option<Self> {
        Self::resolve(length, state.gap(), state.size(), state.count())
    }
}

/// One placed segment: its rectangle and the ratio interval it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBox {
    pub index: usize,
    pub rect: Rect,
    /// Axis position of the edge nearer the full end of the track.
    pub start: f64,
    /// Axis position of the edge nearer the empty end.
    pub end: f64,
    pub start_ratio: f64,
    pub end_ratio: f64,
}

/// Places `plan.count` segments from the full end of the track (bottom or
/// left) towards the empty end.
pub fn place_segments(track: &Track, plan: &SegmentPlan) -> Vec<SegmentBox> {
    let bounds = track.bounds;
    let step = plan.size + plan.gap;
    (0..plan.count as usize)
        .map(|index| {
            let offset = index as f64 * step;
            let (rect, start, end) = if track.is_vertical() {
                let bottom = bounds.bottom() - offset;
                let top = bottom - plan.size;
                (
                    Rect::from_edges(bounds.left, top, bounds.right(), bottom),
                    bottom,
                    top,
                )
            } else {
                let left = bounds.left + offset;
                let right = left + plan.size;
                (
                    Rect::from_edges(left, bounds.top, right, bounds.bottom()),
                    left,
                    right,
                )
            };
            SegmentBox {
                index,
                rect,
                start,
                end,
                start_ratio: track.ratio_of(start),
                end_ratio: track.ratio_of(end),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn gap_and_size_stretch_to_fill() {
        let plan = SegmentPlan::resolve(
            100.0,
            Some(Length::Absolute(2.0)),
            Some(Length::Absolute(8.0)),
            None,
        )
        .unwrap();
        assert_eq!(plan.count, 10);
        assert!((plan.size - 8.163265306).abs() < 1e-6);
        assert!((plan.gap - 2.040816327).abs() < 1e-6);
        assert!((plan.span() - 100.0).abs() < EPS);
    }

    #[test]
    fn gap_and_count_derive_size() {
        let plan =
            SegmentPlan::resolve(90.0, Some(Length::Absolute(3.0)), None, Some(5)).unwrap();
        assert!((plan.size - 15.6).abs() < EPS);
        assert_eq!(plan.gap, 3.0);
    }

    #[test]
    fn size_and_count_derive_gap() {
        let plan =
            SegmentPlan::resolve(90.0, None, Some(Length::Absolute(10.0)), Some(5)).unwrap();
        assert!((plan.gap - 10.0).abs() < EPS);
    }

    #[test]
    fn single_segment_has_no_gap() {
        let plan =
            SegmentPlan::resolve(90.0, None, Some(Length::Absolute(10.0)), Some(1)).unwrap();
        assert_eq!(plan.gap, 0.0);
        assert_eq!(plan.count, 1);
    }

    #[test]
    fn percentages_resolve_against_length() {
        let plan = SegmentPlan::resolve(
            200.0,
            Some(Length::Percent(1.0)),
            None,
            Some(4),
        )
        .unwrap();
        assert_eq!(plan.gap, 2.0);
        assert!((plan.size - 48.5).abs() < EPS);
    }

    #[test]
    fn unresolvable_inputs_are_empty() {
        assert_eq!(SegmentPlan::resolve(100.0, Some(Length::Absolute(2.0)), None, None), None);
        assert_eq!(SegmentPlan::resolve(100.0, None, None, None), None);
        let two = Some(Length::Absolute(2.0));
        assert_eq!(SegmentPlan::resolve(0.0, two, two, None), None);
        // Segment larger than the track.
        assert_eq!(
            SegmentPlan::resolve(10.0, two, Some(Length::Absolute(20.0)), None),
            None
        );
        // Gaps alone exceed the track.
        assert_eq!(SegmentPlan::resolve(10.0, Some(Length::Absolute(5.0)), None, Some(4)), None);
        // Segments overlap.
        assert_eq!(SegmentPlan::resolve(10.0, None, Some(Length::Absolute(5.0)), Some(4)), None);
    }

    #[test]
    fn sub_pixel_segments_are_not_drawable() {
        assert_eq!(
            SegmentPlan::resolve(100.0, Some(Length::Absolute(1e-9)), None, Some(100_000_000)),
            None
        );
        assert_eq!(
            SegmentPlan::resolve(
                100.0,
                Some(Length::Absolute(1e-9)),
                Some(Length::Absolute(1e-6)),
                None
            ),
            None
        );
        let plan =
            SegmentPlan::resolve(100.0, None, Some(Length::Absolute(MIN_SEGMENT_SIZE)), Some(2))
                .unwrap();
        assert_eq!(plan.size, MIN_SEGMENT_SIZE);
    }

    #[test]
    fn vertical_placement_walks_upwards() {
        let track = Track::new(Rect::new(10.0, 20.0, 30.0, 90.0), Orientation::Vertical);
        let plan = SegmentPlan { count: 5, size: 10.0, gap: 10.0 };
        let boxes = place_segments(&track, &plan);
        assert_eq!(boxes.len(), 5);
        assert_eq!(boxes[0].rect, Rect::new(10.0, 100.0, 30.0, 10.0));
        assert_eq!(boxes[0].start_ratio, 0.0);
        assert_eq!(boxes[1].start, 90.0);
        assert_eq!(boxes[4].rect.top, 20.0);
        assert_eq!(boxes[4].end_ratio, 1.0);
        assert!((boxes[2].start_ratio - 4.0 / 9.0).abs() < 1e-7);
    }

    #[test]
    fn horizontal_placement_walks_right() {
        let track = Track::new(Rect::new(0.0, 5.0, 90.0, 8.0), Orientation::Horizontal);
        let plan = SegmentPlan { count: 3, size: 20.0, gap: 15.0 };
        let boxes = place_segments(&track, &plan);
        assert_eq!(boxes[1].rect, Rect::new(35.0, 5.0, 20.0, 8.0));
        assert_eq!(boxes[2].end, 90.0);
        assert_eq!(boxes[2].end_ratio, 1.0);
    }

    #[test]
    fn ratios_are_clamped_and_rounded() {
        let track = Track::new(Rect::new(0.0, 0.0, 3.0, 100.0), Orientation::Horizontal);
        assert_eq!(track.ratio_of(-1.0), 0.0);
        assert_eq!(track.ratio_of(4.0), 1.0);
        assert_eq!(track.ratio_of(1.0), 0.3333333);
    }
}
