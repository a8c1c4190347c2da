//! Session context persistence with file locking.
//!
//! The parser itself never stores context; the CLI keeps the last exercise
//! and set number here between invocations.

use crate::{Error, Result, SessionContext};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl SessionContext {
    /// Load the session context from a file with shared locking
    ///
    /// Returns an empty context if the file doesn't exist or is corrupted.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No session file found, starting without context");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open session file {:?}: {}. Using defaults.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock session file {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;

        if let Err(e) = read {
            tracing::warn!("Failed to read session file {:?}: {}. Using defaults.", path, e);
            return Ok(Self::default());
        }

        match serde_json::from_str::<SessionContext>(&contents) {
            Ok(ctx) => {
                tracing::debug!("Loaded session context from {:?}", path);
                Ok(ctx)
            }
            Err(e) => {
                tracing::warn!("Failed to parse session file {:?}: {}. Using defaults.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save the session context atomically (temp file, sync, rename)
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "session path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(serde_json::to_string(self)?.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved session context to {:?}", path);
        Ok(())
    }

    /// Forget the stored session
    pub fn clear(path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!("Cleared session context at {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");

        SessionContext::new("bench press", 3).save(&path).unwrap();

        let loaded = SessionContext::load(&path).unwrap();
        assert_eq!(loaded.active_exercise(), Some("bench press"));
        assert_eq!(loaded.last_set_number, 3);
        assert!(!loaded.is_voice_continuation);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ctx = SessionContext::load(&temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(ctx, SessionContext::default());
    }

    #[test]
    fn test_corrupted_session_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let ctx = SessionContext::load(&path).unwrap();
        assert!(ctx.active_exercise().is_none());
    }

    #[test]
    fn test_clear() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");

        SessionContext::new("squat", 5).save(&path).unwrap();
        SessionContext::clear(&path).unwrap();
        assert!(!path.exists());

        // Clearing twice is fine
        SessionContext::clear(&path).unwrap();
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");

        SessionContext::new("deadlift", 1).save(&path).unwrap();
        SessionContext::new("deadlift", 2).save(&path).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "session.json")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }
}
