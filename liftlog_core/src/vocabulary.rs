//! Exercise vocabulary.
//!
//! Recognition is an ordered table of matchers evaluated in priority order:
//! chest, back, legs, shoulders, arms, then the generic equipment-prefixed
//! and verb-suffixed patterns. The first match wins, so within a category
//! the more specific patterns come first.

use once_cell::sync::Lazy;
use regex::Regex;

/// Muscle-group category of a matcher
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    /// "cable crossover", "kettlebell swing"
    Equipment,
    /// "landmine press", "zottman curl"
    Movement,
}

/// How a matcher turns its match into a name
#[derive(Clone, Copy, Debug)]
pub enum NameRule {
    /// Always this canonical name
    Canonical(&'static str),
    /// The matched words themselves, trimmed at the first quantity word
    Matched,
}

/// One row of the recognition table
#[derive(Debug)]
pub struct ExerciseMatcher {
    pub category: Category,
    pub pattern: Regex,
    pub rule: NameRule,
}

/// A recognized exercise
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recognized {
    pub category: Category,
    pub name: String,
}

/// Words that end (or cannot start) a matched exercise name
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "at", "did", "do", "for", "i", "my", "of", "the", "then", "with", "x",
    "set", "sets", "rep", "reps", "times", "kg", "kgs", "kilo", "kilos", "kilogram",
    "kilograms", "lb", "lbs", "pound", "pounds", "next", "another", "again", "same",
];

static TABLE: Lazy<Vec<ExerciseMatcher>> = Lazy::new(build_table);

fn canonical(category: Category, pattern: &str, name: &'static str) -> ExerciseMatcher {
    ExerciseMatcher {
        category,
        pattern: Regex::new(pattern).expect("vocabulary pattern"),
        rule: NameRule::Canonical(name),
    }
}

fn matched(category: Category, pattern: &str) -> ExerciseMatcher {
    ExerciseMatcher {
        category,
        pattern: Regex::new(pattern).expect("vocabulary pattern"),
        rule: NameRule::Matched,
    }
}

fn build_table() -> Vec<ExerciseMatcher> {
    use Category::*;

    vec![
        // Chest
        canonical(Chest, r"\bincline (?:bench press|bench|press)\b", "incline bench press"),
        canonical(Chest, r"\bdecline (?:bench press|bench|press)\b", "decline bench press"),
        canonical(Chest, r"\bbench(?:\s+press(?:es)?)?\b", "bench press"),
        canonical(Chest, r"\bchest press\b", "chest press"),
        canonical(Chest, r"\b(?:chest |pec )?(?:flyes|flies|flys|fly)\b", "chest fly"),
        canonical(Chest, r"\bpush[\s-]?ups?\b", "push ups"),
        canonical(Chest, r"\bdips?\b", "dips"),
        // Back
        canonical(Back, r"\b(?:romanian deadlifts?|rdls?)\b", "romanian deadlift"),
        canonical(Back, r"\bsumo dead[\s-]?lifts?\b", "sumo deadlift"),
        canonical(Back, r"\bdead[\s-]?lifts?\b", "deadlift"),
        canonical(Back, r"\blat pull[\s-]?downs?\b", "lat pulldown"),
        canonical(Back, r"\bpull[\s-]?ups?\b", "pull ups"),
        canonical(Back, r"\bchin[\s-]?ups?\b", "chin ups"),
        canonical(Back, r"\b(?:barbell|bent[\s-]over) rows?\b", "barbell row"),
        canonical(Back, r"\bseated (?:cable )?rows?\b", "seated row"),
        canonical(Back, r"\bdumbbell rows?\b", "dumbbell row"),
        // Legs
        canonical(Legs, r"\bfront squats?\b", "front squat"),
        canonical(Legs, r"\bgoblet squats?\b", "goblet squat"),
        canonical(Legs, r"\b(?:bulgarian )?split squats?\b", "split squat"),
        canonical(Legs, r"\bsquats?\b", "squat"),
        canonical(Legs, r"\bleg press(?:es)?\b", "leg press"),
        canonical(Legs, r"\blunges?\b", "lunges"),
        canonical(Legs, r"\bleg curls?\b", "leg curl"),
        canonical(Legs, r"\bleg extensions?\b", "leg extension"),
        canonical(Legs, r"\bcalf raises?\b", "calf raise"),
        canonical(Legs, r"\bhip thrusts?\b", "hip thrust"),
        // Shoulders
        canonical(Shoulders, r"\b(?:overhead press|ohp)\b", "overhead press"),
        canonical(Shoulders, r"\bmilitary press\b", "military press"),
        canonical(Shoulders, r"\bshoulder press\b", "shoulder press"),
        canonical(Shoulders, r"\barnold press\b", "arnold press"),
        canonical(Shoulders, r"\b(?:lateral|side) raises?\b", "lateral raise"),
        canonical(Shoulders, r"\bfront raises?\b", "front raise"),
        canonical(Shoulders, r"\bface pulls?\b", "face pull"),
        canonical(Shoulders, r"\bshrugs?\b", "shrugs"),
        // Arms
        canonical(Arms, r"\bhammer curls?\b", "hammer curl"),
        canonical(Arms, r"\bpreacher curls?\b", "preacher curl"),
        canonical(Arms, r"\bbiceps? curls?\b", "bicep curl"),
        canonical(Arms, r"\btriceps? (?:push[\s-]?downs?|press[\s-]?downs?)\b", "tricep pushdown"),
        canonical(Arms, r"\b(?:overhead )?triceps? extensions?\b", "tricep extension"),
        canonical(Arms, r"\bskull[\s-]?crushers?\b", "skull crusher"),
        canonical(Arms, r"\bcurls?\b", "bicep curl"),
        // Generic
        matched(
            Equipment,
            r"\b(?:smith machine|ez bar|dumbbell|barbell|cable|machine|kettlebell|band)(?:\s+[a-z]+){1,2}",
        ),
        matched(
            Movement,
            r"\b[a-z]+\s+(?:press|raises?|curls?|rows?|extensions?|pull[\s-]?downs?|flyes|flys?|swings?|pulls?)\b",
        ),
    ]
}

/// The recognition table, in priority order
pub fn table() -> &'static [ExerciseMatcher] {
    &TABLE
}

/// Lower-case, trim and collapse internal whitespace
pub fn canonicalize(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a word can be part of an exercise name
pub(crate) fn is_name_word(word: &str) -> bool {
    !word.is_empty()
        && !word.chars().any(|c| c.is_ascii_digit())
        && !STOP_WORDS.contains(&word)
}

/// Keep the leading run of name words, skipping leading stop words
fn trim_matched(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split_whitespace()
        .skip_while(|w| !is_name_word(w))
        .take_while(|w| is_name_word(w))
        .collect();

    // A lone generic word ("press", "cable") does not name an exercise
    if words.len() < 2 {
        return None;
    }
    Some(words.join(" "))
}

impl ExerciseMatcher {
    /// Try this matcher against lower-cased text
    pub fn apply(&self, text: &str) -> Option<Recognized> {
        let found = self.pattern.find(text)?;
        let name = match self.rule {
            NameRule::Canonical(name) => name.to_string(),
            NameRule::Matched => trim_matched(found.as_str())?,
        };
        Some(Recognized {
            category: self.category,
            name: canonicalize(&name),
        })
    }
}

/// Recognize an exercise in the text, first match wins
pub fn recognize(text: &str) -> Option<Recognized> {
    let lowered = text.to_lowercase();
    let hit = table().iter().find_map(|matcher| matcher.apply(&lowered));

    if let Some(ref recognized) = hit {
        tracing::trace!(
            "Recognized {:?} exercise '{}'",
            recognized.category,
            recognized.name
        );
    }
    hit
}
