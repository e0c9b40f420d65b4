//! Whole-file JSON persistence helpers
//!
//! Both persisted documents in this bot are small enough to be read and
//! rewritten wholesale on every mutation. Loading fails soft: a missing or
//! malformed file yields the provided default instead of an error, so a
//! corrupted document can never take the bot down.

use crate::core::error::AppResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Loads a JSON document from `path`, falling back to `default` if the file
/// is missing or cannot be parsed. Parse failures are logged, never
/// propagated.
pub fn load_json<T: DeserializeOwned>(path: &Path, default: T) -> T {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return default,
        Err(e) => {
            log::error!("Failed to read {}: {}. Falling back to default.", path.display(), e);
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Malformed JSON in {}: {}. Falling back to default.", path.display(), e);
            default
        }
    }
}

/// Overwrites `path` with the JSON serialization of `value`, creating the
/// parent directory if needed.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");

        let users = vec![1i64, 42, 6744885896];
        save_json(&path, &users).unwrap();

        let loaded: Vec<i64> = load_json(&path, Vec::new());
        assert_eq!(loaded, users);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.json");

        let loaded: Vec<i64> = load_json(&path, vec![7]);
        assert_eq!(loaded, vec![7]);
    }

    #[test]
    fn test_load_malformed_file_returns_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let loaded: Vec<i64> = load_json(&path, Vec::new());
        assert_eq!(loaded, Vec::<i64>::new());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/users.json");

        save_json(&path, &vec![5i64]).unwrap();
        assert!(path.exists());
    }
}
