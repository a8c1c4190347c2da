//! Quantity and exercise extraction from a single utterance.
//!
//! Sets, reps and weight are found by independent pattern searches, any of
//! which may be absent. Defaults are applied later, when the continuity
//! engine knows whether the utterance starts an exercise or extends one.

use crate::sets::{extract_individual_sets, ExplicitSet};
use crate::vocabulary::{self, Recognized};
use crate::weight::{self, normalize};
use crate::{ExerciseRecord, SetRecord, WeightMeasurement, WeightUnit};
use once_cell::sync::Lazy;
use regex::Regex;

/// Label used when an utterance has no words at all
pub const UNKNOWN_EXERCISE: &str = "unknown exercise";

/// Upper bound on uniformly generated sets
pub const MAX_UNIFORM_SETS: u32 = 20;

const UNIT_PATTERN: &str = r"kgs?|kilos?|kilograms?|lbs?|pounds?";

pub(crate) static SETS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)\s*sets?\b").expect("sets regex"));

pub(crate) static SETS_X_REPS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+)\s*x\s*(\d+)\b").expect("sets x reps regex"));

pub(crate) static REPS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+)\s*(?:reps?|repetitions?|times)\b").expect("reps regex")
});

/// "sets of 10", "of 10": the number is reps unless a unit follows it
pub(crate) static OF_REPS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\bof\s+(\d+)\b(\s*(?:{UNIT_PATTERN})\b)?")).expect("of reps regex")
});

pub(crate) static WEIGHT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(\d+(?:\.\d+)?)\s*({UNIT_PATTERN})\b")).expect("weight regex")
});

/// "at 60", "with 60": a unitless weight unless followed by sets/reps
pub(crate) static AT_WEIGHT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:at|with)\s+(\d+(?:\.\d+)?)\b(\s*(?:sets?|reps?|times)\b)?")
        .expect("at weight regex")
});

const NUMBER_WORDS: &[(&str, u32)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
];

/// Quantity-bearing words that never start a fallback label
const QUANTITY_WORDS: &[&str] = &[
    "set", "sets", "rep", "reps", "times", "x", "kg", "kgs", "kilo", "kilos", "kilogram",
    "kilograms", "lb", "lbs", "pound", "pounds",
];

/// Sets/reps/weight found in one utterance
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Quantities {
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub weight: Option<WeightMeasurement>,
    /// Unit implied by the whole utterance
    pub unit: WeightUnit,
}

/// Defaults applied to absent quantities
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Defaults {
    pub sets: u32,
    pub reps: u32,
}

impl Defaults {
    /// A complete, standalone description of an exercise
    pub const STANDARD: Defaults = Defaults { sets: 3, reps: 10 };
    /// One more set in an ongoing exercise
    pub const INCREMENTAL: Defaults = Defaults { sets: 1, reps: 1 };
}

/// Everything the extractors found in one utterance
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    /// Exercise recognized by the vocabulary table
    pub recognized: Option<Recognized>,
    /// Best-effort label when nothing was recognized
    pub label: String,
    pub quantities: Quantities,
    /// Per-set descriptions; when non-empty they replace uniform sets
    pub explicit_sets: Vec<ExplicitSet>,
}

impl Extraction {
    /// Recognized name, falling back to the best-effort label
    pub fn name(&self) -> &str {
        self.recognized
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or(&self.label)
    }

    pub fn names_exercise(&self) -> bool {
        self.recognized.is_some()
    }

    /// Produce (reps, weight) per set, applying defaults to absent values
    pub fn materialize(&self, defaults: Defaults) -> Vec<ExplicitSet> {
        if !self.explicit_sets.is_empty() {
            return self.explicit_sets.clone();
        }

        let q = &self.quantities;
        let count = q.sets.unwrap_or(defaults.sets).clamp(1, MAX_UNIFORM_SETS);
        let reps = q.reps.unwrap_or(defaults.reps);
        let weight = q.weight.unwrap_or_else(|| WeightMeasurement::zero(q.unit));

        (0..count).map(|_| ExplicitSet { reps, weight }).collect()
    }
}

fn number_word(word: &str) -> Option<u32> {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, value)| *value)
}

/// Split a word into leading punctuation, core, and trailing punctuation
fn split_word(word: &str) -> (&str, &str, &str) {
    let rest = word.trim_start_matches(|c: char| !c.is_alphanumeric());
    let core = rest.trim_end_matches(|c: char| !c.is_alphanumeric());
    (&word[..word.len() - rest.len()], core, &rest[core.len()..])
}

/// Read one spoken number from the start of `words`
///
/// Handles "twenty five", "one hundred" and "two hundred forty". Returns the
/// value and how many words it took; trailing punctuation ends a number.
fn read_number(words: &[&str]) -> Option<(u32, usize)> {
    let mut value = 0u32;
    let mut used = 0;

    for word in words {
        let (_, core, suffix) = split_word(word);
        let tail = value % 100;
        let next = if used == 0 {
            number_word(core)
        } else if core == "hundred" {
            (1..100).contains(&value).then(|| value * 100)
        } else {
            number_word(core)
                .filter(|&v| {
                    (v < 10 && tail >= 20 && tail % 10 == 0) || (value >= 100 && tail == 0)
                })
                .map(|v| value + v)
        };

        match next {
            Some(v) => {
                value = v;
                used += 1;
            }
            None => break,
        }
        if !suffix.is_empty() {
            break;
        }
    }

    (used > 0).then_some((value, used))
}

/// Lower-case and replace spoken numbers with digits
pub(crate) fn prepare(utterance: &str) -> String {
    let lowered = utterance.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(words.len());

    let mut i = 0;
    while i < words.len() {
        match read_number(&words[i..]) {
            Some((value, used)) => {
                let (prefix, _, _) = split_word(words[i]);
                let (_, _, suffix) = split_word(words[i + used - 1]);
                out.push(format!("{}{}{}", prefix, value, suffix));
                i += used;
            }
            None => {
                out.push(words[i].to_string());
                i += 1;
            }
        }
    }

    out.join(" ")
}

fn capture_u32(re: &Regex, text: &str, group: usize) -> Option<u32> {
    re.captures(text)?.get(group)?.as_str().parse().ok()
}

/// Reps from "N reps", "NxM", or "of N" (in that order)
pub(crate) fn find_reps(text: &str) -> Option<u32> {
    capture_u32(&REPS_RE, text, 1)
        .or_else(|| capture_u32(&SETS_X_REPS_RE, text, 2))
        .or_else(|| {
            OF_REPS_RE
                .captures_iter(text)
                .find(|c| c.get(2).is_none())
                .and_then(|c| c[1].parse().ok())
        })
}

/// Weight from "N <unit>" or "at N"
///
/// `fallback_unit` applies to unitless mentions; `own_unit` decides whether
/// an explicit unit token overrides it.
pub(crate) fn find_weight(
    text: &str,
    fallback_unit: WeightUnit,
    own_unit: bool,
) -> Option<WeightMeasurement> {
    if let Some(caps) = WEIGHT_RE.captures(text) {
        let magnitude: f64 = caps[1].parse().ok()?;
        let unit = if own_unit {
            weight::parse_unit(&caps[2]).unwrap_or(fallback_unit)
        } else {
            fallback_unit
        };
        return Some(normalize(magnitude, Some(unit)));
    }

    AT_WEIGHT_RE
        .captures_iter(text)
        .find(|c| c.get(2).is_none())
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(|magnitude| normalize(magnitude, Some(fallback_unit)))
}

/// Find sets, reps and weight in an utterance
pub fn extract_quantities(utterance: &str) -> Quantities {
    let text = prepare(utterance);
    let unit = weight::utterance_unit(&text);

    let sets = capture_u32(&SETS_RE, &text, 1).or_else(|| capture_u32(&SETS_X_REPS_RE, &text, 1));

    Quantities {
        sets,
        reps: find_reps(&text),
        weight: find_weight(&text, unit, false),
        unit,
    }
}

/// Best-effort label from the first two or three words
pub fn fallback_label(utterance: &str) -> String {
    let words: Vec<String> = utterance
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return UNKNOWN_EXERCISE.to_string();
    }

    let leading: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .take_while(|w| {
            !w.chars().any(|c| c.is_ascii_digit()) && !QUANTITY_WORDS.contains(w)
        })
        .take(3)
        .collect();

    if leading.is_empty() {
        words.iter().take(3).cloned().collect::<Vec<_>>().join(" ")
    } else {
        leading.join(" ")
    }
}

/// Exercise name for an utterance, recognized or best-effort
pub fn extract_exercise_name(utterance: &str) -> String {
    vocabulary::recognize(utterance)
        .map(|r| r.name)
        .unwrap_or_else(|| fallback_label(utterance))
}

/// Run every extractor over one utterance
pub fn extract(utterance: &str) -> Extraction {
    let extraction = Extraction {
        recognized: vocabulary::recognize(utterance),
        label: fallback_label(utterance),
        quantities: extract_quantities(utterance),
        explicit_sets: extract_individual_sets(utterance),
    };

    tracing::debug!(
        "Extracted '{}' (recognized: {}, explicit sets: {}) from {:?}",
        extraction.name(),
        extraction.names_exercise(),
        extraction.explicit_sets.len(),
        utterance
    );

    extraction
}

/// Standalone, non-incremental parse: sets numbered from 1
pub fn extract_record(utterance: &str) -> ExerciseRecord {
    let extraction = extract(utterance);
    let sets = extraction
        .materialize(Defaults::STANDARD)
        .into_iter()
        .zip(1..)
        .map(|(s, n)| SetRecord {
            set: n,
            reps: s.reps,
            weight: s.weight,
        })
        .collect();

    ExerciseRecord::new(extraction.name(), sets)
}
