//! Workout history built from the journal.
//!
//! The journal stores one parse outcome per utterance. Summaries want one
//! record per exercise performed, so continuation outcomes are folded into
//! the record they continue.

use crate::wal::{self, JournalEntry};
use crate::{Result, WorkoutEntry};
use chrono::NaiveDate;
use std::path::Path;

/// Fold journal entries into workout records, preserving log order
///
/// A continuation appends its sets to the latest record of the same date and
/// exercise. Anything else (or a continuation with nothing to attach to)
/// starts a new record.
pub fn merge_entries(entries: &[JournalEntry]) -> Vec<WorkoutEntry> {
    let mut workouts: Vec<WorkoutEntry> = Vec::new();

    for entry in entries {
        let outcome = &entry.outcome;
        if outcome.sets().is_empty() {
            continue;
        }

        let target = if outcome.is_continuation {
            workouts
                .iter_mut()
                .rev()
                .find(|w| w.date == entry.date && w.record.name == outcome.exercise())
        } else {
            None
        };

        match target {
            Some(workout) => workout.record.sets.extend(outcome.sets().iter().cloned()),
            None => workouts.push(WorkoutEntry::new(entry.date, outcome.record.clone())),
        }
    }

    workouts
}

/// Load workouts dated within `from..=to` from the journal
pub fn load_workouts(
    journal_path: &Path,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<WorkoutEntry>> {
    let entries: Vec<JournalEntry> = wal::read_entries(journal_path)?
        .into_iter()
        .filter(|e| e.date >= from && e.date <= to)
        .collect();

    let workouts = merge_entries(&entries);
    tracing::info!(
        "Loaded {} workouts ({} journal entries) for {}..={}",
        workouts.len(),
        entries.len(),
        from,
        to
    );
    Ok(workouts)
}
