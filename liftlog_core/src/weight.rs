//! Weight normalization.
//!
//! Kilograms are the canonical unit. Every weight that leaves the parser,
//! whichever path produced it, goes through this module so both the kg and
//! lb values are rounded to the nearest 0.5.

use crate::{WeightMeasurement, WeightUnit};
use once_cell::sync::Lazy;
use regex::Regex;

pub const LBS_TO_KG: f64 = 0.453592;
pub const KG_TO_LBS: f64 = 2.20462;

static POUND_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:lbs?|pounds?)\b").expect("pound token regex"));

/// Round to the nearest 0.5
pub fn round_to_half(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}

/// Convert a spoken magnitude into a [`WeightMeasurement`]
///
/// An absent unit is treated as kilograms. Negative magnitudes are not
/// rejected; they pass through the arithmetic.
pub fn normalize(magnitude: f64, unit: Option<WeightUnit>) -> WeightMeasurement {
    match unit.unwrap_or(WeightUnit::Kg) {
        WeightUnit::Lbs => WeightMeasurement {
            weight_kg: round_to_half(magnitude * LBS_TO_KG),
            weight_lbs: round_to_half(magnitude),
            weight_unit: WeightUnit::Lbs,
        },
        WeightUnit::Kg => WeightMeasurement {
            weight_kg: round_to_half(magnitude),
            weight_lbs: round_to_half(magnitude * KG_TO_LBS),
            weight_unit: WeightUnit::Kg,
        },
    }
}

impl WeightMeasurement {
    /// Normalize a value that is already in kilograms, remembering the unit
    /// the user spoke in.
    pub fn from_kg(kg: f64, spoken_unit: WeightUnit) -> Self {
        Self {
            weight_kg: round_to_half(kg),
            weight_lbs: round_to_half(kg * KG_TO_LBS),
            weight_unit: spoken_unit,
        }
    }

    /// Zero weight (bodyweight or unspecified)
    pub fn zero(unit: WeightUnit) -> Self {
        Self {
            weight_kg: 0.0,
            weight_lbs: 0.0,
            weight_unit: unit,
        }
    }

    /// Value in the unit the user spoke
    pub fn spoken_value(&self) -> f64 {
        match self.weight_unit {
            WeightUnit::Kg => self.weight_kg,
            WeightUnit::Lbs => self.weight_lbs,
        }
    }
}

/// Map a unit token to its family
pub fn parse_unit(token: &str) -> Option<WeightUnit> {
    match token.trim().to_lowercase().as_str() {
        "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => Some(WeightUnit::Kg),
        "lb" | "lbs" | "pound" | "pounds" => Some(WeightUnit::Lbs),
        _ => None,
    }
}

/// Whether the text mentions a pound-family unit anywhere
pub fn mentions_pounds(text: &str) -> bool {
    POUND_TOKEN.is_match(text)
}

/// Unit implied by the utterance as a whole
pub fn utterance_unit(text: &str) -> WeightUnit {
    if mentions_pounds(text) {
        WeightUnit::Lbs
    } else {
        WeightUnit::Kg
    }
}
