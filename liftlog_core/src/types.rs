//! Core domain types for liftlog.
//!
//! This module defines the records produced by the utterance parser and
//! consumed by the summary generator:
//! - Weights and units
//! - Sets and exercise records
//! - The caller-owned session context and the parse outcome
//! - Dated workout entries for aggregation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Weights
// ============================================================================

/// Unit the user originally spoke a weight in
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WeightUnit {
    #[default]
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "lbs")]
    Lbs,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

/// A weight held in kilograms, with its derived pound value for display.
///
/// Both values are rounded to the nearest 0.5 independently; see
/// [`crate::weight::normalize`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WeightMeasurement {
    pub weight_kg: f64,
    pub weight_lbs: f64,
    pub weight_unit: WeightUnit,
}

// ============================================================================
// Sets and Exercises
// ============================================================================

/// One performed set
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    pub set: u32,
    pub reps: u32,
    #[serde(flatten)]
    pub weight: WeightMeasurement,
}

impl SetRecord {
    /// Training load of this set in kilograms
    pub fn volume_kg(&self) -> f64 {
        f64::from(self.reps) * self.weight.weight_kg
    }
}

/// An exercise and its sets, keyed by canonical name
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    #[serde(rename = "exercise")]
    pub name: String,
    pub sets: Vec<SetRecord>,
}

impl ExerciseRecord {
    pub fn new(name: impl Into<String>, sets: Vec<SetRecord>) -> Self {
        Self {
            name: name.into(),
            sets,
        }
    }

    pub fn total_reps(&self) -> u32 {
        self.sets.iter().map(|s| s.reps).sum()
    }

    /// Sum of reps x weight_kg across all sets
    pub fn volume_kg(&self) -> f64 {
        self.sets.iter().map(SetRecord::volume_kg).sum()
    }

    /// Heaviest set by kilogram value (first one wins on ties)
    pub fn max_weight(&self) -> Option<&WeightMeasurement> {
        self.sets
            .iter()
            .map(|s| &s.weight)
            .fold(None, |best: Option<&WeightMeasurement>, w| match best {
                Some(b) if b.weight_kg >= w.weight_kg => Some(b),
                _ => Some(w),
            })
    }

    pub fn last_set_number(&self) -> Option<u32> {
        self.sets.last().map(|s| s.set)
    }
}

// ============================================================================
// Session Context and Parse Outcome
// ============================================================================

/// Caller-held state used to interpret incremental continuations.
///
/// The engine never stores this; callers pass it in and derive the next
/// value from the returned [`ParseOutcome`].
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    #[serde(default)]
    pub last_exercise: Option<String>,
    #[serde(default)]
    pub last_set_number: u32,
    #[serde(default)]
    pub is_voice_continuation: bool,
}

impl SessionContext {
    pub fn new(last_exercise: impl Into<String>, last_set_number: u32) -> Self {
        Self {
            last_exercise: Some(last_exercise.into()),
            last_set_number,
            is_voice_continuation: false,
        }
    }

    /// The exercise in progress, if any. Blank names count as none.
    pub fn active_exercise(&self) -> Option<&str> {
        self.last_exercise
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Result of parsing one utterance
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutcome {
    #[serde(flatten)]
    pub record: ExerciseRecord,
    pub is_new_exercise: bool,
    pub is_continuation: bool,
    /// Last set number after applying this outcome
    pub set_number: u32,
}

impl ParseOutcome {
    pub fn exercise(&self) -> &str {
        &self.record.name
    }

    pub fn sets(&self) -> &[SetRecord] {
        &self.record.sets
    }

    /// Context to hand back to the engine on the next call
    pub fn next_context(&self) -> SessionContext {
        SessionContext {
            last_exercise: Some(self.record.name.clone()),
            last_set_number: self.set_number,
            is_voice_continuation: false,
        }
    }
}

// ============================================================================
// Aggregation Input
// ============================================================================

/// An exercise record attributed to a calendar date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutEntry {
    pub date: NaiveDate,
    pub record: ExerciseRecord,
}

impl WorkoutEntry {
    pub fn new(date: NaiveDate, record: ExerciseRecord) -> Self {
        Self { date, record }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(n: u32, reps: u32, kg: f64) -> SetRecord {
        SetRecord {
            set: n,
            reps,
            weight: WeightMeasurement {
                weight_kg: kg,
                weight_lbs: 0.0,
                weight_unit: WeightUnit::Kg,
            },
        }
    }

    #[test]
    fn test_record_aggregates() {
        let record = ExerciseRecord::new(
            "bench press",
            vec![set(1, 10, 60.0), set(2, 8, 65.0), set(3, 6, 65.0)],
        );

        assert_eq!(record.total_reps(), 24);
        assert_eq!(record.volume_kg(), 600.0 + 520.0 + 390.0);
        assert_eq!(record.max_weight().unwrap().weight_kg, 65.0);
        assert_eq!(record.last_set_number(), Some(3));
    }

    #[test]
    fn test_blank_last_exercise_is_inactive() {
        let ctx = SessionContext::new("   ", 3);
        assert_eq!(ctx.active_exercise(), None);

        let ctx = SessionContext::new(" squat ", 1);
        assert_eq!(ctx.active_exercise(), Some("squat"));
    }

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = ParseOutcome {
            record: ExerciseRecord::new("squat", vec![set(4, 8, 100.0)]),
            is_new_exercise: false,
            is_continuation: true,
            set_number: 4,
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["exercise"], "squat");
        assert_eq!(value["isContinuation"], true);
        assert_eq!(value["setNumber"], 4);
        assert_eq!(value["sets"][0]["set"], 4);
        assert_eq!(value["sets"][0]["weight_kg"], 100.0);
        assert_eq!(value["sets"][0]["weight_unit"], "kg");

        let parsed: ParseOutcome = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, outcome);
    }

    #[test]
    fn test_context_wire_shape() {
        let json = r#"{"lastExercise":"bench press","lastSetNumber":3,"isVoiceContinuation":true}"#;
        let ctx: SessionContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.active_exercise(), Some("bench press"));
        assert_eq!(ctx.last_set_number, 3);
        assert!(ctx.is_voice_continuation);
    }
}
