//! Daily and weekly workout summaries.
//!
//! Summaries are recomputed from [`WorkoutEntry`] values on every call.
//! The text block and the table data are rendered from the same rows.

use crate::{SetRecord, WeightMeasurement, WorkoutEntry};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tabled::{Table, Tabled};

/// A summary, or an explanation of why there is nothing to summarize
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary<T> {
    NoData { message: String },
    Ready(T),
}

impl<T> Summary<T> {
    pub fn text(&self) -> &str
    where
        T: AsRef<str>,
    {
        match self {
            Summary::NoData { message } => message.as_str(),
            Summary::Ready(report) => report.as_ref(),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Summary::Ready(report) => Some(report),
            Summary::NoData { .. } => None,
        }
    }
}

// ============================================================================
// Daily
// ============================================================================

/// One row of the per-set table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct SetRow {
    #[tabled(rename = "Exercise")]
    pub exercise: String,
    #[tabled(rename = "Set")]
    pub set: u32,
    #[tabled(rename = "Reps")]
    pub reps: u32,
    #[tabled(rename = "kg")]
    pub weight_kg: f64,
    #[tabled(rename = "lbs")]
    pub weight_lbs: f64,
}

/// Sets logged for one exercise on one day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyExercise {
    pub exercise: String,
    pub set_count: u32,
    pub total_reps: u32,
    pub volume_kg: f64,
    pub sets: Vec<SetRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub exercise_count: u32,
    pub set_count: u32,
    pub total_reps: u32,
    pub volume_kg: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub text: String,
    pub table_data: Vec<SetRow>,
    pub stats: DailyStats,
    pub exercises: Vec<DailyExercise>,
}

impl AsRef<str> for DailySummary {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Group records by exercise name, keeping first-appearance order
fn group_sets<'a>(entries: impl Iterator<Item = &'a WorkoutEntry>) -> Vec<(String, Vec<&'a WorkoutEntry>)> {
    let mut groups: Vec<(String, Vec<&WorkoutEntry>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(name, _)| *name == entry.record.name) {
            Some((_, members)) => members.push(entry),
            None => groups.push((entry.record.name.clone(), vec![entry])),
        }
    }
    groups
}

fn format_kg(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Summarize one calendar day
pub fn daily_summary(entries: &[WorkoutEntry], date: NaiveDate) -> Summary<DailySummary> {
    let groups = group_sets(entries.iter().filter(|e| e.date == date));
    if groups.is_empty() {
        return Summary::NoData {
            message: format!("No workouts logged for {}.", date),
        };
    }

    let exercises: Vec<DailyExercise> = groups
        .into_iter()
        .map(|(exercise, members)| {
            let sets: Vec<SetRecord> = members
                .iter()
                .flat_map(|e| e.record.sets.iter().cloned())
                .collect();
            DailyExercise {
                set_count: sets.len() as u32,
                total_reps: sets.iter().map(|s| s.reps).sum(),
                volume_kg: sets.iter().map(SetRecord::volume_kg).sum(),
                exercise,
                sets,
            }
        })
        .collect();

    let table_data: Vec<SetRow> = exercises
        .iter()
        .flat_map(|ex| {
            ex.sets.iter().map(move |s| SetRow {
                exercise: ex.exercise.clone(),
                set: s.set,
                reps: s.reps,
                weight_kg: s.weight.weight_kg,
                weight_lbs: s.weight.weight_lbs,
            })
        })
        .collect();

    let stats = DailyStats {
        exercise_count: exercises.len() as u32,
        set_count: exercises.iter().map(|e| e.set_count).sum(),
        total_reps: exercises.iter().map(|e| e.total_reps).sum(),
        volume_kg: exercises.iter().map(|e| e.volume_kg).sum(),
    };

    let mut text = format!(
        "Workout for {}\n{} exercises, {} sets, {} reps, {} kg volume\n\n",
        date,
        stats.exercise_count,
        stats.set_count,
        stats.total_reps,
        format_kg(stats.volume_kg)
    );
    for ex in &exercises {
        text.push_str(&format!("{}: {} sets\n", ex.exercise, ex.set_count));
    }
    text.push('\n');
    text.push_str(&Table::new(table_data.clone()).to_string());

    Summary::Ready(DailySummary {
        date,
        text,
        table_data,
        stats,
        exercises,
    })
}

// ============================================================================
// Weekly
// ============================================================================

/// Per-exercise totals for a week
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Tabled)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRow {
    #[tabled(rename = "Exercise")]
    pub exercise: String,
    #[tabled(rename = "Sets")]
    pub total_sets: u32,
    #[tabled(rename = "Reps")]
    pub total_reps: u32,
    #[tabled(rename = "Max kg")]
    pub max_weight_kg: f64,
    #[tabled(rename = "Max lbs")]
    pub max_weight_lbs: f64,
    #[tabled(rename = "Workouts")]
    pub workouts_count: u32,
    #[tabled(rename = "Avg sets")]
    pub avg_sets_per_workout: f64,
    #[tabled(rename = "Volume kg")]
    pub volume_kg: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    /// Distinct dates with at least one logged exercise
    pub workout_count: u32,
    pub exercise_count: u32,
    pub total_sets: u32,
    pub total_reps: u32,
    pub volume_kg: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub start: NaiveDate,
    /// Last day of the period, inclusive
    pub end: NaiveDate,
    pub text: String,
    pub table_data: Vec<WeeklyRow>,
    pub stats: WeeklyStats,
}

impl AsRef<str> for WeeklySummary {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn weekly_row(exercise: String, members: &[&WorkoutEntry]) -> WeeklyRow {
    let sets: Vec<&SetRecord> = members.iter().flat_map(|e| e.record.sets.iter()).collect();
    let dates: BTreeSet<NaiveDate> = members.iter().map(|e| e.date).collect();

    let max = sets
        .iter()
        .map(|s| s.weight)
        .fold(None, |best: Option<WeightMeasurement>, w| match best {
            Some(b) if b.weight_kg >= w.weight_kg => Some(b),
            _ => Some(w),
        })
        .unwrap_or_default();

    let total_sets = sets.len() as u32;
    let workouts_count = dates.len() as u32;

    WeeklyRow {
        exercise,
        total_sets,
        total_reps: sets.iter().map(|s| s.reps).sum(),
        max_weight_kg: max.weight_kg,
        max_weight_lbs: max.weight_lbs,
        workouts_count,
        avg_sets_per_workout: if workouts_count == 0 {
            0.0
        } else {
            round_hundredths(f64::from(total_sets) / f64::from(workouts_count))
        },
        volume_kg: sets.iter().map(|s| s.volume_kg()).sum(),
    }
}

/// Last day of the seven-day period starting at `start`
///
/// `None` when the period runs past the end of the calendar.
pub fn week_end(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_signed(Duration::days(6))
}

/// Summarize the seven days starting at `start`
///
/// A period that runs past the end of the calendar is cut short there.
pub fn weekly_summary(entries: &[WorkoutEntry], start: NaiveDate) -> Summary<WeeklySummary> {
    let end = week_end(start).unwrap_or(NaiveDate::MAX);
    let in_week: Vec<&WorkoutEntry> = entries
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .collect();

    if in_week.is_empty() {
        return Summary::NoData {
            message: format!("No workouts logged between {} and {}.", start, end),
        };
    }

    let table_data: Vec<WeeklyRow> = group_sets(in_week.iter().copied())
        .into_iter()
        .map(|(exercise, members)| weekly_row(exercise, &members))
        .collect();

    let workout_dates: BTreeSet<NaiveDate> = in_week.iter().map(|e| e.date).collect();
    let stats = WeeklyStats {
        workout_count: workout_dates.len() as u32,
        exercise_count: table_data.len() as u32,
        total_sets: table_data.iter().map(|r| r.total_sets).sum(),
        total_reps: table_data.iter().map(|r| r.total_reps).sum(),
        volume_kg: table_data.iter().map(|r| r.volume_kg).sum(),
    };

    let mut text = format!(
        "Week of {} to {}\n{} workouts, {} exercises, {} sets, {} kg volume\n\n",
        start,
        end,
        stats.workout_count,
        stats.exercise_count,
        stats.total_sets,
        format_kg(stats.volume_kg)
    );
    text.push_str(&Table::new(table_data.clone()).to_string());

    Summary::Ready(WeeklySummary {
        start,
        end,
        text,
        table_data,
        stats,
    })
}
