//! Workout journal.
//!
//! Every logged parse outcome is appended to a JSONL (JSON Lines) file with
//! file locking so concurrent CLI invocations cannot interleave writes.

use crate::{ParseOutcome, Result};
use chrono::{DateTime, NaiveDate, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One logged utterance and what it was parsed into
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    /// Calendar date the sets count towards
    pub date: NaiveDate,
    pub utterance: String,
    pub outcome: ParseOutcome,
    #[serde(default)]
    pub assisted: bool,
}

impl JournalEntry {
    pub fn new(date: NaiveDate, utterance: impl Into<String>, outcome: ParseOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            date,
            utterance: utterance.into(),
            outcome,
            assisted: false,
        }
    }
}

/// Entry sink trait for persisting journal entries
pub trait EntrySink {
    fn append(&mut self, entry: &JournalEntry) -> Result<()>;
}

/// JSONL-based journal sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl EntrySink for JsonlSink {
    fn append(&mut self, entry: &JournalEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        // Serialize before writing so a failure leaves no partial line
        let mut line = String::new();
        if ends_mid_line(&file)? {
            tracing::warn!("Journal ends with a partial line, starting a new one");
            line.push('\n');
        }
        line.push_str(&serde_json::to_string(entry)?);
        line.push('\n');

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended entry {} to journal", entry.id);
        Ok(())
    }
}

/// Whether the last byte of a non-empty file is something other than a newline
fn ends_mid_line(mut file: &File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read all entries from a journal file
///
/// Lines that fail to parse (partial writes, hand edits) are skipped with a
/// warning.
pub fn read_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<JournalEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from journal", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::parse_utterance, SessionContext};

    fn create_test_entry(utterance: &str) -> JournalEntry {
        let outcome = parse_utterance(utterance, &SessionContext::default());
        JournalEntry::new(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            utterance,
            outcome,
        )
    }

    #[test]
    fn test_append_and_read_single_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workouts.jsonl");

        let entry = create_test_entry("bench press 3 sets of 10 at 60 kg");
        let mut sink = JsonlSink::new(&path);
        sink.append(&entry).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], entry);
    }

    #[test]
    fn test_append_multiple_entries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/workouts.jsonl");

        let mut sink = JsonlSink::new(&path);
        for _ in 0..5 {
            sink.append(&create_test_entry("squat 5x5 100kg")).unwrap();
        }

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn test_read_missing_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let entries = read_entries(&temp_dir.path().join("nonexistent.jsonl")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workouts.jsonl");

        let mut sink = JsonlSink::new(&path);
        sink.append(&create_test_entry("deadlift 1 set of 5 at 140 kg")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{ not json }}").unwrap();
            write!(file, r#"{{"id":"partial"#).unwrap();
        }

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome.exercise(), "deadlift");
    }

    #[test]
    fn test_append_after_partial_line() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("workouts.jsonl");
        std::fs::write(&path, r#"{"id":"trunc"#).unwrap();

        let mut sink = JsonlSink::new(&path);
        sink.append(&create_test_entry("squat 5x5 100kg")).unwrap();

        let entries = read_entries(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome.exercise(), "squat");
    }
}
