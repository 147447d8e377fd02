//! Persisted pointer configuration.
//!
//! Only the segment parameters that are currently live are written; the
//! derived one is left out and recomputed from the track on load.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::color_scale::ColorScaleRecord;
use crate::constraint::SettingValue;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}

/// Serializable form of an LED pointer's own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedRecord {
    /// Also accepts a bare `"linear"` or `"ordinal"` for a default scale.
    #[serde(deserialize_with = "color_scale_setting::deserialize")]
    pub color_scale: ColorScaleRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<SettingValue>,
    /// Literal dimmer color; `Some(None)` is the "none" color.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "dimmer_literal"
    )]
    pub dimmer: Option<Option<Color>>,
}

impl LedRecord {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

mod color_scale_setting {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::color_scale::{ColorScale, ColorScaleRecord, LinearColorScale, OrdinalColorScale};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<ColorScaleRecord, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(kind) => match kind.as_str() {
                "linear" => Ok(LinearColorScale::default().record()),
                "ordinal" => Ok(OrdinalColorScale::default().record()),
                other => Err(D::Error::custom(format!("unknown color scale type {other:?}"))),
            },
            value => ColorScaleRecord::deserialize(value).map_err(D::Error::custom),
        }
    }
}

mod dimmer_literal {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::color::{format_optional_color, parse_optional_color, Color};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<Color>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(color) => serializer.serialize_str(&format_optional_color(*color)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<Color>>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        text.map(|t| parse_optional_color(&t).map_err(serde::de::Error::custom))
            .transpose()
    }
}
