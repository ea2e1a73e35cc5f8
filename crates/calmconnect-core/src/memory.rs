//! Durable transcript storage.
//!
//! One record per deployment: a sequence of `{role, text}` pairs under a
//! fixed well-known key. Disk format: a JSON array in
//! `~/.calmconnect/memory/{key}.json`.
//!
//! Failure discipline (both directions, by contract):
//! - `load` failure ≡ no prior history — never an error to the caller.
//! - `save` failure is reported but non-fatal — the in-memory transcript
//!   stays authoritative for the rest of the session.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, warn};

use crate::types::Transcript;
use crate::utils;

/// The fixed key the session transcript is persisted under.
pub const MEMORY_KEY: &str = "messages";

/// Why a record could not be persisted.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write record {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─────────────────────────────────────────────
// MemoryStore trait
// ─────────────────────────────────────────────

/// Durable mapping from a fixed key to a serialized transcript.
pub trait MemoryStore: Send + Sync {
    /// Load the transcript stored under `key`.
    ///
    /// A missing, empty, or unreadable record is valid initial state, not a
    /// failure — implementations return an empty transcript and log.
    fn load(&self, key: &str) -> Transcript;

    /// Persist `transcript` under `key`, replacing any previous record.
    fn save(&self, key: &str, transcript: &Transcript) -> anyhow::Result<()>;
}

// ─────────────────────────────────────────────
// FileStore
// ─────────────────────────────────────────────

/// File-backed store — one JSON file per key.
pub struct FileStore {
    /// Directory where `.json` records live.
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir` (defaults to `~/.calmconnect/memory/`).
    /// The directory is created if it doesn't exist.
    pub fn new(dir: Option<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.unwrap_or_else(utils::get_memory_path);
        std::fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    /// The JSON file path for a record key.
    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", utils::safe_filename(key)))
    }
}

impl MemoryStore for FileStore {
    fn load(&self, key: &str) -> Transcript {
        let path = self.record_path(key);
        if !path.exists() {
            debug!(key = key, "no persisted record, starting empty");
            return Transcript::new();
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                warn!(key = key, error = %e, "failed to read record, starting empty");
                return Transcript::new();
            }
        };

        match serde_json::from_str::<Transcript>(&content) {
            Ok(transcript) => {
                debug!(
                    key = key,
                    messages = transcript.len(),
                    "loaded transcript from disk"
                );
                transcript
            }
            Err(e) => {
                warn!(key = key, error = %e, "failed to parse record, starting empty");
                Transcript::new()
            }
        }
    }

    fn save(&self, key: &str, transcript: &Transcript) -> anyhow::Result<()> {
        let path = self.record_path(key);
        let json = serde_json::to_string(transcript).map_err(StoreError::from)?;
        std::fs::write(&path, json).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(
            key = key,
            messages = transcript.len(),
            "saved transcript to {}",
            path.display()
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use tempfile::tempdir;

    fn make_store() -> (FileStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = FileStore::new(Some(dir.path().to_path_buf())).unwrap();
        (store, dir)
    }

    #[test]
    fn test_load_missing_record_is_empty() {
        let (store, _dir) = make_store();
        let transcript = store.load(MEMORY_KEY);
        assert!(transcript.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (store, _dir) = make_store();

        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("Hi"));
        transcript.push(ChatMessage::assistant("Hello!"));

        store.save(MEMORY_KEY, &transcript).unwrap();
        let loaded = store.load(MEMORY_KEY);

        assert_eq!(loaded, transcript);
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let (store, _dir) = make_store();

        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("first"));
        store.save(MEMORY_KEY, &transcript).unwrap();

        transcript.clear();
        store.save(MEMORY_KEY, &transcript).unwrap();

        assert!(store.load(MEMORY_KEY).is_empty());
    }

    #[test]
    fn test_corrupt_record_treated_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(Some(dir.path().to_path_buf())).unwrap();

        std::fs::write(dir.path().join("messages.json"), "not json {{{").unwrap();

        assert!(store.load(MEMORY_KEY).is_empty());
    }

    #[test]
    fn test_record_survives_new_store_instance() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::new(Some(dir.path().to_path_buf())).unwrap();
            let mut transcript = Transcript::new();
            transcript.push(ChatMessage::user("remember me"));
            store.save(MEMORY_KEY, &transcript).unwrap();
        }

        let store = FileStore::new(Some(dir.path().to_path_buf())).unwrap();
        let loaded = store.load(MEMORY_KEY);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.messages()[0].text, "remember me");
    }

    #[test]
    fn test_record_file_is_json_array_of_role_text() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(Some(dir.path().to_path_buf())).unwrap();

        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("check the schema"));
        store.save(MEMORY_KEY, &transcript).unwrap();

        let content = std::fs::read_to_string(dir.path().join("messages.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["role"], "user");
        assert_eq!(records[0]["text"], "check the schema");
    }

    #[test]
    fn test_keys_are_independent() {
        let (store, _dir) = make_store();

        let mut a = Transcript::new();
        a.push(ChatMessage::user("a"));
        let mut b = Transcript::new();
        b.push(ChatMessage::user("b"));
        b.push(ChatMessage::assistant("b2"));

        store.save("one", &a).unwrap();
        store.save("two", &b).unwrap();

        assert_eq!(store.load("one").len(), 1);
        assert_eq!(store.load("two").len(), 2);
    }
}
