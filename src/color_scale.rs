//! Value → color mapping with auto-ranging.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Resolves data values to colors. `None` is the "none" color.
///
/// The auto-range calls are driven by the pointer once per color-scale
/// invalidation: `start_auto_calc`, `extend_data_range`, `finish_auto_calc`
/// when [`needs_auto_calc`](ColorScale::needs_auto_calc) holds, otherwise
/// `reset_data_range` followed by `extend_data_range`.
pub trait ColorScale {
    fn value_to_color(&self, value: f64) -> Option<Color>;
    fn needs_auto_calc(&self) -> bool;
    fn start_auto_calc(&mut self);
    fn extend_data_range(&mut self, minimum: f64, maximum: f64);
    fn finish_auto_calc(&mut self);
    fn reset_data_range(&mut self);
    /// Persistable description of this scale.
    fn record(&self) -> ColorScaleRecord;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DataRange {
    min: f64,
    max: f64,
}

impl DataRange {
    const EMPTY: DataRange = DataRange {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    fn extend(&mut self, min: f64, max: f64) {
        self.min = self.min.min(min.min(max));
        self.max = self.max.max(min.max(max));
    }

    fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

// ============================================================================
// LINEAR
// ============================================================================

/// Gradient over evenly spaced color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearColorScale {
    colors: Vec<Color>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    data: DataRange,
    auto: Option<(f64, f64)>,
}

impl LinearColorScale {
    pub fn new(colors: Vec<Color>) -> Self {
        Self {
            colors,
            minimum: None,
            maximum: None,
            data: DataRange::EMPTY,
            auto: None,
        }
    }

    /// Fixes both ends; the scale stops auto-ranging.
    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Effective (min, max) used for color lookup.
    pub fn range(&self) -> Option<(f64, f64)> {
        let (auto_min, auto_max) = self.auto.unzip();
        Some((self.minimum.or(auto_min)?, self.maximum.or(auto_max)?))
    }
}

impl Default for LinearColorScale {
    fn default() -> Self {
        Self::new(vec![Color::new(0x64, 0xb5, 0xf6), Color::new(0xef, 0x6c, 0x00)])
    }
}

impl ColorScale for LinearColorScale {
    fn value_to_color(&self, value: f64) -> Option<Color> {
        let (first, rest) = self.colors.split_first()?;
        if rest.is_empty() {
            return Some(*first);
        }
        let (min, max) = self.range()?;
        let t = if max == min {
            0.0
        } else {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        };
        let seg = t * rest.len() as f64;
        let i = (seg as usize).min(rest.len() - 1);
        Some(self.colors[i].mix(self.colors[i + 1], seg - i as f64))
    }

    fn needs_auto_calc(&self) -> bool {
        self.minimum.is_none() || self.maximum.is_none()
    }

    fn start_auto_calc(&mut self) {
        self.data = DataRange::EMPTY;
    }

    fn extend_data_range(&mut self, minimum: f64, maximum: f64) {
        self.data.extend(minimum, maximum);
    }

    fn finish_auto_calc(&mut self) {
        self.auto = (!self.data.is_empty()).then_some((self.data.min, self.data.max));
    }

    fn reset_data_range(&mut self) {
        self.data = DataRange::EMPTY;
    }

    fn record(&self) -> ColorScaleRecord {
        ColorScaleRecord::Linear {
            colors: self.colors.clone(),
            minimum: self.minimum,
            maximum: self.maximum,
        }
    }
}

// ============================================================================
// ORDINAL
// ============================================================================

/// One band of an ordinal scale. Missing ends are open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<f64>,
    pub color: Option<Color>,
}

impl ColorRange {
    pub fn new(from: Option<f64>, to: Option<f64>, color: Option<Color>) -> Self {
        Self { from, to, color }
    }

    fn contains(&self, value: f64) -> bool {
        self.from.map_or(true, |from| value >= from) && self.to.map_or(true, |to| value <= to)
    }
}

/// Discrete bands; the first band containing a value wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrdinalColorScale {
    ranges: Vec<ColorRange>,
    data: DataRange,
}

impl Default for DataRange {
    fn default() -> Self {
        DataRange::EMPTY
    }
}

impl OrdinalColorScale {
    pub fn new(ranges: Vec<ColorRange>) -> Self {
        Self {
            ranges,
            data: DataRange::EMPTY,
        }
    }

    pub fn ranges(&self) -> &[ColorRange] {
        &self.ranges
    }

    /// Range reported by the last `extend_data_range` calls.
    pub fn data_range(&self) -> Option<(f64, f64)> {
        (!self.data.is_empty()).then_some((self.data.min, self.data.max))
    }
}

impl ColorScale for OrdinalColorScale {
    fn value_to_color(&self, value: f64) -> Option<Color> {
        self.ranges
            .iter()
            .find(|range| range.contains(value))
            .and_then(|range| range.color)
    }

    fn needs_auto_calc(&self) -> bool {
        false
    }

    fn start_auto_calc(&mut self) {
        self.data = DataRange::EMPTY;
    }

    fn extend_data_range(&mut self, minimum: f64, maximum: f64) {
        self.data.extend(minimum, maximum);
    }

    fn finish_auto_calc(&mut self) {}

    fn reset_data_range(&mut self) {
        self.data = DataRange::EMPTY;
    }

    fn record(&self) -> ColorScaleRecord {
        ColorScaleRecord::Ordinal {
            ranges: self.ranges.clone(),
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ColorScaleRecord {
    Linear {
        colors: Vec<Color>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
    },
    Ordinal {
        ranges: Vec<ColorRange>,
    },
}

impl ColorScaleRecord {
    pub fn build(&self) -> Box<dyn ColorScale> {
        match self {
            ColorScaleRecord::Linear {
                colors,
                minimum,
                maximum,
            } => {
                let mut scale = LinearColorScale::new(colors.clone());
                scale.minimum = *minimum;
                scale.maximum = *maximum;
                Box::new(scale)
            }
            ColorScaleRecord::Ordinal { ranges } => {
                Box::new(OrdinalColorScale::new(ranges.clone()))
            }
        }
    }
}
