//! Session continuity engine.
//!
//! Decides whether an utterance starts a new exercise or continues the one
//! in the caller's [`SessionContext`], and numbers the resulting sets.
//!
//! ## Decision procedure
//!
//! 1. **Cue continuation**: a continuation cue ("next set", "again", ...)
//!    or a caller-flagged voice continuation, with an active exercise →
//!    inherit it and number from `lastSetNumber + 1`.
//! 2. **Named exercise**: the vocabulary recognizes an exercise → new
//!    exercise numbered from 1, even when it repeats the active one.
//! 3. **Implicit continuation**: nothing recognized but an exercise is
//!    active → inherit it, numbering as in (1).
//! 4. **Fresh**: no session → new exercise under the best-effort label.
//!
//! The engine holds no state: identical (utterance, context) pairs always
//! yield identical outcomes.

use crate::extract::{self, Defaults, Extraction};
use crate::vocabulary;
use crate::{ExerciseRecord, ParseOutcome, SessionContext, SetRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static CONTINUATION_CUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:next set|another set|add set|one more|again|same|continue|more)\b")
        .expect("continuation cue regex")
});

/// Where the caller's session stands before this utterance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    ActiveExercise,
}

impl SessionState {
    pub fn of(ctx: &SessionContext) -> Self {
        if ctx.active_exercise().is_some() {
            SessionState::ActiveExercise
        } else {
            SessionState::NoSession
        }
    }
}

/// Which rule of the decision procedure fired
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    CueContinuation,
    NamedExercise,
    ImplicitContinuation,
    Fresh,
}

impl Transition {
    pub fn is_continuation(&self) -> bool {
        matches!(
            self,
            Transition::CueContinuation | Transition::ImplicitContinuation
        )
    }
}

/// Whether the utterance contains a continuation cue
pub fn has_continuation_cue(utterance: &str) -> bool {
    CONTINUATION_CUE_RE.is_match(&utterance.to_lowercase())
}

/// Apply the decision procedure
///
/// `names_exercise` is whether the vocabulary recognized an exercise name.
pub fn decide(utterance: &str, ctx: &SessionContext, names_exercise: bool) -> Transition {
    match SessionState::of(ctx) {
        SessionState::ActiveExercise
            if ctx.is_voice_continuation || has_continuation_cue(utterance) =>
        {
            Transition::CueContinuation
        }
        _ if names_exercise => Transition::NamedExercise,
        SessionState::ActiveExercise => Transition::ImplicitContinuation,
        SessionState::NoSession => Transition::Fresh,
    }
}

/// Parse one utterance against the caller's context
pub fn parse_utterance(utterance: &str, ctx: &SessionContext) -> ParseOutcome {
    let extraction = extract::extract(utterance);
    resolve_extraction(utterance, ctx, &extraction)
}

/// Turn an extraction into an outcome under the continuity rules
pub fn resolve_extraction(
    utterance: &str,
    ctx: &SessionContext,
    extraction: &Extraction,
) -> ParseOutcome {
    let transition = decide(utterance, ctx, extraction.names_exercise());

    let (name, numbered_after) = match (transition.is_continuation(), ctx.active_exercise()) {
        (true, Some(active)) => (vocabulary::canonicalize(active), ctx.last_set_number),
        _ => (extraction.name().to_string(), 0),
    };

    let defaults = if transition.is_continuation() || ctx.is_voice_continuation {
        Defaults::INCREMENTAL
    } else {
        Defaults::STANDARD
    };

    let materialized = extraction.materialize(defaults);
    let wanted = materialized.len();

    // Set numbers never wrap: sets past u32::MAX are dropped
    let sets: Vec<SetRecord> = materialized
        .into_iter()
        .zip(1u32..)
        .map_while(|(s, offset)| {
            numbered_after.checked_add(offset).map(|set| SetRecord {
                set,
                reps: s.reps,
                weight: s.weight,
            })
        })
        .collect();

    if sets.len() < wanted {
        tracing::warn!(
            "Dropped {} sets of '{}': set numbers exhausted after {}",
            wanted - sets.len(),
            name,
            numbered_after
        );
    }

    let set_number = sets.last().map(|s| s.set).unwrap_or(numbered_after);

    tracing::debug!(
        "{:?}: '{}' sets {}..={}",
        transition,
        name,
        numbered_after.saturating_add(1),
        set_number
    );

    ParseOutcome {
        record: ExerciseRecord::new(name, sets),
        is_new_exercise: !transition.is_continuation(),
        is_continuation: transition.is_continuation(),
        set_number,
    }
}
