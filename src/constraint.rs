//! Gap / size / count bookkeeping.
//!
//! Only two of the three segment parameters may be explicit at a time. The
//! two most recently touched distinct properties stay live; introducing a
//! third evicts the oldest and its value becomes derived from the track.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// RAW INPUT
// ============================================================================

/// A setting as it arrives from code or from a persisted record: either a
/// number or a string such as `"12"` or `"5%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Number(f64),
    Text(String),
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Number(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Number(value as f64)
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Number(value as f64)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Length> for SettingValue {
    fn from(value: Length) -> Self {
        match value {
            Length::Absolute(v) => SettingValue::Number(v),
            Length::Percent(_) => SettingValue::Text(value.to_string()),
        }
    }
}

impl SettingValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            SettingValue::Number(v) => Some(*v),
            SettingValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

// ============================================================================
// LENGTHS
// ============================================================================

/// Gap or size: absolute track units, or a percentage of the track length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Absolute(f64),
    Percent(f64),
}

impl Length {
    /// Accepts strictly positive finite numbers and percentages.
    pub fn normalize(input: &SettingValue) -> Option<Self> {
        let length = match input {
            SettingValue::Text(s) if s.trim().ends_with('%') => {
                let digits = s.trim().trim_end_matches('%').trim();
                Length::Percent(digits.parse::<f64>().ok()?)
            }
            other => Length::Absolute(other.as_number()?),
        };
        let raw = match length {
            Length::Absolute(v) | Length::Percent(v) => v,
        };
        (raw.is_finite() && raw > 0.0).then_some(length)
    }

    /// Absolute value against a track of `total` units.
    pub fn resolve(self, total: f64) -> f64 {
        match self {
            Length::Absolute(v) => v,
            Length::Percent(p) => total * p / 100.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Absolute(v) => write!(f, "{v}"),
            Length::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// Accepts values that round to a natural number (>= 1).
pub fn normalize_count(input: &SettingValue) -> Option<u32> {
    let value = input.as_number()?.round();
    (value.is_finite() && value >= 1.0 && value <= u32::MAX as f64).then_some(value as u32)
}

// ============================================================================
// AUTOMATON
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prop {
    Gap,
    Size,
    Count,
}

/// Which two of {gap, size, count} are explicit, and their stored values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintState {
    gap: Option<Length>,
    size: Option<Length>,
    count: Option<u32>,
    history: [Option<Prop>; 2],
}

impl ConstraintState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gap(&self) -> Option<Length> {
        self.gap
    }

    pub fn size(&self) -> Option<Length> {
        self.size
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    /// The history buffer, oldest first.
    pub fn history(&self) -> impl Iterator<Item = Prop> + '_ {
        self.history.iter().flatten().copied()
    }

    /// Whether `prop` appears in the history buffer.
    pub fn is_live(&self, prop: Prop) -> bool {
        self.history.contains(&Some(prop))
    }

    /// Returns `true` when the stored gap changed. Invalid input leaves both
    /// the value and the history untouched.
    pub fn set_gap(&mut self, input: &SettingValue) -> bool {
        let Some(gap) = Length::normalize(input) else {
            return false;
        };
        self.touch(Prop::Gap);
        replace(&mut self.gap, gap)
    }

    pub fn set_size(&mut self, input: &SettingValue) -> bool {
        let Some(size) = Length::normalize(input) else {
            return false;
        };
        self.touch(Prop::Size);
        replace(&mut self.size, size)
    }

    pub fn set_count(&mut self, input: &SettingValue) -> bool {
        let Some(count) = normalize_count(input) else {
            return false;
        };
        self.touch(Prop::Count);
        replace(&mut self.count, count)
    }

    /// Records that `prop` was set, evicting the oldest distinct property once
    /// the buffer is full.
    fn touch(&mut self, prop: Prop) {
        match self.history {
            [None, _] => self.history[0] = Some(prop),
            [Some(_), None] => self.history[1] = Some(prop),
            [Some(oldest), Some(newest)] if newest != prop => {
                self.history = [Some(newest), Some(prop)];
                if oldest != prop {
                    self.evict(oldest);
                }
            }
            _ => {}
        }
    }

    fn evict(&mut self, prop: Prop) {
        tracing::trace!(?prop, "led constraint evicted");
        match prop {
            Prop::Gap => self.gap = None,
            Prop::Size => self.size = None,
            Prop::Count => self.count = None,
        }
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        false
    } else {
        *slot = Some(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(state: &ConstraintState) -> Vec<Prop> {
        state.history().collect()
    }

    #[test]
    fn third_distinct_property_evicts_oldest() {
        let mut state = ConstraintState::new();
        state.set_gap(&2.0.into());
        state.set_size(&8.0.into());
        state.set_count(&10.into());
        assert_eq!(state.gap(), None);
        assert_eq!(live(&state), vec![Prop::Size, Prop::Count]);

        state.set_gap(&3.0.into());
        assert_eq!(state.size(), None);
        assert_eq!(state.count(), Some(10));
        assert_eq!(state.gap(), Some(Length::Absolute(3.0)));
        assert_eq!(live(&state), vec![Prop::Count, Prop::Gap]);
    }

    #[test]
    fn repeating_newest_does_not_evict() {
        let mut state = ConstraintState::new();
        state.set_gap(&2.0.into());
        state.set_size(&8.0.into());
        state.set_size(&9.0.into());
        assert_eq!(state.gap(), Some(Length::Absolute(2.0)));
        assert_eq!(state.size(), Some(Length::Absolute(9.0)));
        assert_eq!(live(&state), vec![Prop::Gap, Prop::Size]);
    }

    #[test]
    fn resetting_oldest_swaps_order_without_eviction() {
        let mut state = ConstraintState::new();
        state.set_gap(&2.0.into());
        state.set_size(&8.0.into());
        state.set_gap(&4.0.into());
        assert_eq!(live(&state), vec![Prop::Size, Prop::Gap]);
        assert_eq!(state.size(), Some(Length::Absolute(8.0)));
        assert_eq!(state.gap(), Some(Length::Absolute(4.0)));
    }

    #[test]
    fn repeated_initial_property_fills_both_slots() {
        let mut state = ConstraintState::new();
        state.set_gap(&2.0.into());
        state.set_gap(&3.0.into());
        assert_eq!(live(&state), vec![Prop::Gap, Prop::Gap]);
        state.set_size(&5.0.into());
        // The popped gap letter differs from size, so the gap value goes.
        assert_eq!(state.gap(), None);
        assert_eq!(live(&state), vec![Prop::Gap, Prop::Size]);
    }

    #[test]
    fn invalid_input_is_ignored() {
        let mut state = ConstraintState::new();
        state.set_count(&5.into());
        state.set_gap(&1.0.into());
        let before = state.clone();

        assert!(!state.set_count(&0.into()));
        assert!(!state.set_count(&"abc".into()));
        assert!(!state.set_count(&(-3.0).into()));
        assert!(!state.set_size(&0.0.into()));
        assert!(!state.set_size(&"0%".into()));
        assert!(!state.set_size(&f64::NAN.into()));
        assert_eq!(state, before);
    }

    #[test]
    fn unchanged_value_reports_no_change_but_counts_as_touch() {
        let mut state = ConstraintState::new();
        assert!(state.set_gap(&2.0.into()));
        assert!(!state.set_gap(&2.0.into()));
        assert_eq!(live(&state), vec![Prop::Gap, Prop::Gap]);
    }

    #[test]
    fn normalizes_inputs() {
        assert_eq!(Length::normalize(&"5%".into()), Some(Length::Percent(5.0)));
        assert_eq!(Length::normalize(&" 12 ".into()), Some(Length::Absolute(12.0)));
        assert_eq!(Length::normalize(&"%".into()), None);
        assert_eq!(normalize_count(&"4".into()), Some(4));
        assert_eq!(normalize_count(&2.6.into()), Some(3));
        assert_eq!(normalize_count(&0.4.into()), None);
        assert_eq!(Length::Percent(10.0).resolve(250.0), 25.0);
        assert_eq!(SettingValue::from(Length::Percent(2.5)), SettingValue::Text("2.5%".into()));
    }
}
