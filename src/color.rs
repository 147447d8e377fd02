// ============================================================================
// COLOR PRIMITIVES
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ConfigError;

/// Color representation for segment runs and overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0xff, 0xff, 0xff, 0x01);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Scales the RGB channels towards black. `factor` is clamped to [0, 1].
    pub fn darken(self, factor: f64) -> Self {
        let keep = 1.0 - factor.clamp(0.0, 1.0);
        let channel = |c: u8| (c as f64 * keep).round() as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }

    /// Linear interpolation between two colors, `t` in [0, 1].
    pub fn mix(self, other: Color, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: lerp(self.a, other.a),
        }
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut it = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Self::new(it.next()??, it.next()??, it.next()??))
            }
            6 => Some(Self::new(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Some(Self::rgba(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Packed `0xRRGGBBAA`.
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| ConfigError::InvalidColor(s.to_string()))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses an optional color where the literal `"none"` stands for no color.
pub fn parse_optional_color(text: &str) -> Result<Option<Color>, ConfigError> {
    if text.trim().eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        text.parse().map(Some)
    }
}

/// Writes an optional color, `"none"` for `None`.
pub fn format_optional_color(color: Option<Color>) -> String {
    match color {
        Some(color) => color.to_string(),
        None => "none".to_string(),
    }
}

// ============================================================================
// COLOR KEYS
// ============================================================================

/// Stable identity of a resolved segment color. Segments whose final colors
/// share a key are batched into one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorKey {
    None,
    Rgba(u32),
}

impl ColorKey {
    pub fn of(color: Option<Color>) -> Self {
        match color {
            Some(color) => ColorKey::Rgba(color.to_u32()),
            None => ColorKey::None,
        }
    }
}

// ============================================================================
// FILLS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HatchKind {
    BackwardDiagonal,
    ForwardDiagonal,
    Horizontal,
    Vertical,
    Cross,
}

impl HatchKind {
    /// Whether the pattern covers pixel `(x, y)` for a hatch cell of `size`.
    pub fn covers(self, x: i64, y: i64, size: u32, thickness: u32) -> bool {
        let size = size.max(1) as i64;
        let thickness = thickness.clamp(1, size as u32) as i64;
        let on = |v: i64| v.rem_euclid(size) < thickness;
        match self {
            HatchKind::BackwardDiagonal => on(x + y),
            HatchKind::ForwardDiagonal => on(x - y),
            HatchKind::Horizontal => on(y),
            HatchKind::Vertical => on(x),
            HatchKind::Cross => on(x) || on(y),
        }
    }
}

/// Paint applied to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    #[default]
    None,
    Solid(Color),
    Hatch {
        kind: HatchKind,
        color: Color,
        size: u32,
        thickness: u32,
    },
}

impl Fill {
    pub fn solid(color: Option<Color>) -> Self {
        color.map_or(Fill::None, Fill::Solid)
    }
}
