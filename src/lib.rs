//! Segment layout and color banding for LED-style linear gauge pointers.
//!
//! A [`LedPointer`] splits a rectangular track into equally sized segments,
//! colors each one from a [`ColorScale`], dims the ones past the pointer
//! value and batches equal colors into runs, one path per run.
//!
//! ```
//! use led_gauge::{LedPointer, LinearScale, Orientation, Rect, Scene, Track};
//!
//! let mut pointer = LedPointer::new(Scene::new());
//! pointer.set_gap(2.0).set_size(8.0).set_value(40.0);
//!
//! let track = Track::new(Rect::new(0.0, 0.0, 20.0, 100.0), Orientation::Vertical);
//! let segments = pointer.draw(&track, &LinearScale::new(0.0, 100.0));
//! assert_eq!(segments.len(), 10);
//! ```

// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod bands;
pub mod color;
pub mod color_scale;
pub mod config;
pub mod constraint;
pub mod geometry;
pub mod pointer;
pub mod scale;
pub mod scene;
pub mod surface;
pub mod viewer;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

pub use bands::{Dimmer, RunPlan, Segment};
pub use color::{Color, ColorKey, Fill, HatchKind};
pub use color_scale::{
    ColorRange, ColorScale, ColorScaleRecord, LinearColorScale, OrdinalColorScale,
};
pub use config::{ConfigError, LedRecord};
pub use constraint::{ConstraintState, Length, Prop, SettingValue};
pub use geometry::{Orientation, Rect, SegmentPlan, Track};
pub use pointer::{Invalidation, LedPointer, PointerState, Run};
pub use scale::{LinearScale, Scale};
pub use scene::{Canvas, PathId, Scene};
pub use surface::PathFactory;
pub use viewer::{GaugeCommand, GaugeConfig, LedGauge};
