#![forbid(unsafe_code)]

//! Core domain model and parsing logic for liftlog.
//!
//! This crate provides:
//! - Domain types (weights, sets, exercise records, session context)
//! - Utterance parsing (vocabulary, quantity and set extraction)
//! - The session continuity engine and assisted parsing with fallback
//! - Daily and weekly summaries
//! - Persistence (journal, session context, CSV export)

pub mod types;
pub mod error;
pub mod weight;
pub mod vocabulary;
pub mod extract;
pub mod sets;
pub mod engine;
pub mod assist;
pub mod summary;
pub mod config;
pub mod logging;
pub mod wal;
pub mod history;
pub mod state;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use engine::parse_utterance;
pub use assist::{parse_with_assist, AssistedOutcome, HttpStructurer, ParseSource, Structurer};
pub use summary::{daily_summary, weekly_summary, Summary};
pub use wal::{EntrySink, JournalEntry, JsonlSink};
pub use history::load_workouts;
pub use export::export_csv;
