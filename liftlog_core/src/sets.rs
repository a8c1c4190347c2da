//! Individual-set extraction.
//!
//! Two utterance shapes describe sets one by one rather than uniformly:
//! - ordinal descriptors: "first set 10 reps 100 pounds, second set 8 reps 90 pounds"
//! - rep lists with one shared weight: "2, 3, 4, 5 reps at 40 kg"
//!
//! Either one, when it yields any sets, replaces the uniform output.

use crate::extract::{find_reps, find_weight, prepare};
use crate::weight;
use crate::WeightMeasurement;
use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|\d+(?:st|nd|rd|th))\s+set\b",
    )
    .expect("ordinal set regex")
});

static REP_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+(?:\s*(?:,\s*and|,|and)\s*\d+)+)\s*(?:reps?|repetitions?)\b")
        .expect("rep list regex")
});

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digits regex"));

/// One set described individually, before numbering
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplicitSet {
    pub reps: u32,
    pub weight: WeightMeasurement,
}

/// Sets from ordinal descriptors, in spoken order
///
/// Each descriptor owns the text up to the next one. A descriptor without
/// a rep count is dropped. A unit spoken inside a segment wins over the
/// unit implied by the whole utterance.
pub fn extract_ordinal_sets(utterance: &str) -> Vec<ExplicitSet> {
    let text = prepare(utterance);
    let unit = weight::utterance_unit(&text);

    let starts: Vec<(usize, usize)> = ORDINAL_RE
        .find_iter(&text)
        .map(|m| (m.start(), m.end()))
        .collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, body_start))| {
            let body_end = starts.get(i + 1).map(|&(s, _)| s).unwrap_or(text.len());
            let segment = &text[body_start..body_end];

            let Some(reps) = find_reps(segment) else {
                tracing::debug!("Ordinal set without reps ignored: {:?}", segment.trim());
                return None;
            };
            let weight =
                find_weight(segment, unit, true).unwrap_or_else(|| WeightMeasurement::zero(unit));

            Some(ExplicitSet { reps, weight })
        })
        .collect()
}

/// Whether the number right after `before` is an "at N" / "with N" weight
fn claimed_as_weight(before: &str) -> bool {
    matches!(before.split_whitespace().last(), Some("at" | "with"))
}

/// First rep list whose leading number is not a weight
///
/// In "at 60, 10, 8 reps" the list is "10, 8 reps".
fn find_rep_list(text: &str) -> Option<regex::Captures<'_>> {
    let mut start = 0;
    while let Some(caps) = REP_LIST_RE.captures_at(text, start) {
        let list = caps.get(1)?;
        if !claimed_as_weight(&text[..list.start()]) {
            return Some(caps);
        }
        start = list.start() + DIGITS_RE.find(list.as_str()).map_or(1, |m| m.end());
    }
    None
}

/// Sets from a comma-separated rep list sharing one weight
pub fn extract_rep_list(utterance: &str) -> Vec<ExplicitSet> {
    let text = prepare(utterance);
    let Some(caps) = find_rep_list(&text) else {
        return Vec::new();
    };
    let unit = weight::utterance_unit(&text);

    // The shared weight is searched outside the list itself
    let list = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
    let rest = format!("{} {}", &text[..list.start], &text[list.end..]);
    let weight = find_weight(&rest, unit, false).unwrap_or_else(|| WeightMeasurement::zero(unit));

    DIGITS_RE
        .find_iter(&caps[1])
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .map(|reps| ExplicitSet { reps, weight })
        .collect()
}

/// Ordinal sets if any, otherwise the rep list
pub fn extract_individual_sets(utterance: &str) -> Vec<ExplicitSet> {
    let ordinal = extract_ordinal_sets(utterance);
    if !ordinal.is_empty() {
        return ordinal;
    }
    extract_rep_list(utterance)
}
