// ============================================================================
// LED POINTER
// ============================================================================

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::bands::{color_segments, pack_runs, Dimmer, Segment};
use crate::color::{Color, ColorKey, Fill, HatchKind};
use crate::color_scale::{ColorScale, LinearColorScale};
use crate::config::LedRecord;
use crate::constraint::{ConstraintState, Length, Prop, SettingValue};
use crate::geometry::{place_segments, SegmentPlan, Track};
use crate::scale::Scale;
use crate::surface::PathFactory;

pub const RUN_Z_INDEX: i32 = 0;
pub const HATCH_Z_INDEX: i32 = 99;
pub const INTERACTIVE_Z_INDEX: i32 = 100;

bitflags! {
    /// Work pending before the pointer's paths match its settings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Invalidation: u8 {
        const APPEARANCE = 1 << 0;
        const COLOR_SCALE = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    #[default]
    Normal,
    Hovered,
    Selected,
}

pub type HatchFillResolver = Box<dyn Fn(PointerState) -> Fill>;

/// Hatch used when no resolver is configured: nothing at rest, a diagonal
/// hatch while hovered or selected.
pub fn default_hatch_fill(state: PointerState) -> Fill {
    match state {
        PointerState::Normal => Fill::None,
        PointerState::Hovered | PointerState::Selected => Fill::Hatch {
            kind: HatchKind::BackwardDiagonal,
            color: Color::rgba(0x21, 0x21, 0x21, 0x80),
            size: 6,
            thickness: 1,
        },
    }
}

/// One color run: an owned path and the color it is filled with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Run<H> {
    pub key: ColorKey,
    pub path: H,
    pub color: Option<Color>,
}

/// Runs of the current pass keyed by color.
#[derive(Debug)]
struct RunArena<H> {
    runs: Vec<Run<H>>,
    index: FxHashMap<ColorKey, usize>,
}

impl<H: Copy> RunArena<H> {
    fn new() -> Self {
        Self {
            runs: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    fn get(&self, key: ColorKey) -> Option<&Run<H>> {
        self.index.get(&key).map(|&i| &self.runs[i])
    }

    fn insert(&mut self, run: Run<H>) {
        self.index.insert(run.key, self.runs.len());
        self.runs.push(run);
    }

    fn drain(&mut self) -> impl Iterator<Item = Run<H>> + '_ {
        self.index.clear();
        self.runs.drain(..)
    }
}

/// Discrete-segment pointer for a linear gauge.
///
/// Settings go through the accessors below; [`draw`](LedPointer::draw) then
/// rebuilds every path from scratch and [`colorize`](LedPointer::colorize)
/// repaints existing paths for state-only changes.
pub struct LedPointer<P: PathFactory> {
    surface: P,
    constraints: ConstraintState,
    color_scale: Box<dyn ColorScale>,
    dimmer: Dimmer,
    hatch_fill: HatchFillResolver,
    value: f64,
    runs: RunArena<P::Path>,
    hatch: Option<P::Path>,
    interactive: Option<P::Path>,
    segments: Vec<Segment>,
    plan: Option<SegmentPlan>,
    resolved_range: Option<(f64, f64)>,
    invalidation: Invalidation,
}

impl<P: PathFactory> LedPointer<P> {
    pub fn new(surface: P) -> Self {
        Self {
            surface,
            constraints: ConstraintState::new(),
            color_scale: Box::new(LinearColorScale::default()),
            dimmer: Dimmer::default(),
            hatch_fill: Box::new(default_hatch_fill),
            value: 0.0,
            runs: RunArena::new(),
            hatch: None,
            interactive: None,
            segments: Vec::new(),
            plan: None,
            resolved_range: None,
            invalidation: Invalidation::all(),
        }
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn gap(&self) -> Option<Length> {
        self.constraints.gap()
    }

    /// Sets the gap between segments (number or `"N%"` of the track).
    /// Non-positive or unparsable input is ignored.
    pub fn set_gap(&mut self, value: impl Into<SettingValue>) -> &mut Self {
        let value = value.into();
        if self.constraints.set_gap(&value) {
            self.invalidate(Invalidation::APPEARANCE);
        } else {
            tracing::trace!(?value, gap = ?self.gap(), "led gap unchanged");
        }
        self
    }

    pub fn size(&self) -> Option<Length> {
        self.constraints.size()
    }

    pub fn set_size(&mut self, value: impl Into<SettingValue>) -> &mut Self {
        let value = value.into();
        if self.constraints.set_size(&value) {
            self.invalidate(Invalidation::APPEARANCE);
        } else {
            tracing::trace!(?value, size = ?self.size(), "led size unchanged");
        }
        self
    }

    pub fn count(&self) -> Option<u32> {
        self.constraints.count()
    }

    /// Sets the number of segments; only natural numbers are accepted.
    pub fn set_count(&mut self, value: impl Into<SettingValue>) -> &mut Self {
        let value = value.into();
        if self.constraints.set_count(&value) {
            self.invalidate(Invalidation::APPEARANCE);
        } else {
            tracing::trace!(?value, count = ?self.count(), "led count unchanged");
        }
        self
    }

    pub fn constraints(&self) -> &ConstraintState {
        &self.constraints
    }

    pub fn color_scale(&self) -> &dyn ColorScale {
        self.color_scale.as_ref()
    }

    /// Replaces the color scale. There is no equality check, so every
    /// replacement invalidates the appearance and forces the next pass to
    /// resolve the new scale's range.
    pub fn set_color_scale(&mut self, scale: Box<dyn ColorScale>) -> &mut Self {
        self.color_scale = scale;
        self.invalidate(Invalidation::APPEARANCE | Invalidation::COLOR_SCALE);
        self
    }

    pub fn dimmer(&self) -> &Dimmer {
        &self.dimmer
    }

    pub fn set_dimmer(&mut self, dimmer: Dimmer) -> &mut Self {
        self.dimmer = dimmer;
        self.invalidate(Invalidation::APPEARANCE);
        self
    }

    pub fn set_hatch_fill(
        &mut self,
        resolver: impl Fn(PointerState) -> Fill + 'static,
    ) -> &mut Self {
        self.hatch_fill = Box::new(resolver);
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) -> &mut Self {
        if value.is_finite() && value != self.value {
            self.value = value;
            self.invalidate(Invalidation::APPEARANCE);
        }
        self
    }

    /// Marks the color scale's range for recomputation on the next pass.
    pub fn invalidate_color_scale(&mut self) {
        self.invalidate(Invalidation::APPEARANCE | Invalidation::COLOR_SCALE);
    }

    fn invalidate(&mut self, flags: Invalidation) {
        self.invalidation |= flags;
    }

    pub fn invalidation(&self) -> Invalidation {
        self.invalidation
    }

    pub fn needs_redraw(&self) -> bool {
        !self.invalidation.is_empty()
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    pub fn surface(&self) -> &P {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut P {
        &mut self.surface
    }

    /// Segments of the last pass, in placement order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Resolved count, size and gap of the last pass.
    pub fn plan(&self) -> Option<SegmentPlan> {
        self.plan
    }

    pub fn runs(&self) -> &[Run<P::Path>] {
        &self.runs.runs
    }

    pub fn run_for(&self, color: Option<Color>) -> Option<&Run<P::Path>> {
        self.runs.get(ColorKey::of(color))
    }

    pub fn hatch_path(&self) -> Option<P::Path> {
        self.hatch
    }

    pub fn interactive_path(&self) -> Option<P::Path> {
        self.interactive
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    /// Full layout pass: releases every run, replans the segments on `track`
    /// and emits one path per distinct color, then applies the normal-state
    /// fills.
    pub fn draw(&mut self, track: &Track, scale: &dyn Scale) -> &[Segment] {
        self.release_runs();
        self.prepare_overlays(track);
        self.resolve_color_scale(scale);

        let length = track.length();
        self.plan = SegmentPlan::for_state(length, &self.constraints);
        let boxes = match &self.plan {
            Some(plan) => place_segments(track, plan),
            None => {
                tracing::debug!(
                    length,
                    constraints = ?self.constraints,
                    "led layout has no segments"
                );
                Vec::new()
            }
        };

        let pointer_ratio = scale.transform(self.value).clamp(0.0, 1.0);
        self.segments = color_segments(
            &boxes,
            scale,
            self.color_scale.as_ref(),
            &self.dimmer,
            pointer_ratio,
        );
        self.emit_runs();

        tracing::debug!(
            segments = self.segments.len(),
            runs = self.runs.runs.len(),
            plan = ?self.plan,
            pointer_ratio,
            "led layout"
        );

        self.invalidation = Invalidation::empty();
        self.colorize(PointerState::Normal);
        &self.segments
    }

    /// Reapplies run colors and the hatch fill for `state` without touching
    /// geometry. Does nothing before the first [`draw`](LedPointer::draw).
    pub fn colorize(&mut self, state: PointerState) {
        let Some(hatch) = self.hatch else {
            tracing::trace!(?state, "led colorize before first layout");
            return;
        };
        for run in &self.runs.runs {
            self.surface.set_stroke_none(run.path);
            self.surface.set_fill(run.path, Fill::solid(run.color));
        }
        self.surface.set_stroke_none(hatch);
        self.surface.set_fill(hatch, (self.hatch_fill)(state));
    }

    fn release_runs(&mut self) {
        for run in self.runs.drain() {
            self.surface.release(run.path);
        }
    }

    fn prepare_overlays(&mut self, track: &Track) {
        match self.hatch {
            Some(hatch) => self.surface.clear(hatch),
            None => self.hatch = Some(self.surface.create_path(HATCH_Z_INDEX)),
        }
        let interactive = match self.interactive {
            Some(path) => {
                self.surface.clear(path);
                path
            }
            None => {
                let path = self.surface.create_path(INTERACTIVE_Z_INDEX);
                self.surface.set_stroke_none(path);
                self.surface.set_fill(path, Fill::Solid(Color::TRANSPARENT));
                self.interactive = Some(path);
                path
            }
        };
        self.surface.rect(interactive, &track.bounds);
    }

    fn resolve_color_scale(&mut self, scale: &dyn Scale) {
        let range = (scale.minimum(), scale.maximum());
        let flagged = self.invalidation.contains(Invalidation::COLOR_SCALE);
        if !flagged && self.resolved_range == Some(range) {
            return;
        }
        let color_scale = self.color_scale.as_mut();
        if color_scale.needs_auto_calc() {
            color_scale.start_auto_calc();
            color_scale.extend_data_range(range.0, range.1);
            color_scale.finish_auto_calc();
        } else {
            color_scale.reset_data_range();
            color_scale.extend_data_range(range.0, range.1);
        }
        self.resolved_range = Some(range);
        self.invalidation.remove(Invalidation::COLOR_SCALE);
    }

    fn emit_runs(&mut self) {
        let Some(hatch) = self.hatch else {
            return;
        };
        for plan in pack_runs(&self.segments) {
            let path = self.surface.create_path(RUN_Z_INDEX);
            tracing::trace!(key = ?plan.key, ?path, groups = plan.groups, "led run allocated");
            for &i in &plan.segments {
                let segment = &self.segments[i];
                self.surface.rect(path, &segment.rect);
                if !segment.filled {
                    self.surface.rect(hatch, &segment.rect);
                }
            }
            self.runs.insert(Run {
                key: plan.key,
                path,
                color: plan.color,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Persistence and teardown
    // ------------------------------------------------------------------------

    /// Current settings; only live segment parameters are included.
    pub fn record(&self) -> LedRecord {
        let live = |prop| self.constraints.is_live(prop);
        LedRecord {
            color_scale: self.color_scale.record(),
            gap: self.gap().filter(|_| live(Prop::Gap)).map(SettingValue::from),
            size: self.size().filter(|_| live(Prop::Size)).map(SettingValue::from),
            count: self
                .count()
                .filter(|_| live(Prop::Count))
                .map(SettingValue::from),
            dimmer: self.dimmer.literal(),
        }
    }

    /// Applies a record through the regular setters, gap then size then count.
    pub fn apply_record(&mut self, record: &LedRecord) -> &mut Self {
        if let Some(gap) = &record.gap {
            self.set_gap(gap.clone());
        }
        if let Some(size) = &record.size {
            self.set_size(size.clone());
        }
        if let Some(count) = &record.count {
            self.set_count(count.clone());
        }
        if let Some(color) = record.dimmer {
            self.set_dimmer(Dimmer::Literal(color));
        }
        self.set_color_scale(record.color_scale.build());
        self
    }

    /// Releases every path this pointer owns and returns the surface.
    pub fn dispose(mut self) -> P {
        self.release_runs();
        for path in [self.hatch.take(), self.interactive.take()].into_iter().flatten() {
            self.surface.release(path);
        }
        self.segments.clear();
        self.surface
    }
}
