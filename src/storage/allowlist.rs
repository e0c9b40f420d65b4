//! The allow-list of authorized user IDs
//!
//! Persisted as a JSON array of integers in `allowed_users.json`. The
//! operator identity is implicitly authorized and never stored here. Every
//! mutation persists the whole document before returning, under the store's
//! internal mutex, so concurrent admin and auto-registration paths cannot
//! interleave a load-modify-save.

use crate::core::error::AppResult;
use crate::storage::json::{load_json, save_json};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Thread-safe store for the allow-listed user IDs.
pub struct AllowlistStore {
    path: PathBuf,
    users: Mutex<BTreeSet<i64>>,
}

impl AllowlistStore {
    /// Loads the store from `path`. A missing or malformed file yields an
    /// empty allow-list.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let users: Vec<i64> = load_json(&path, Vec::new());
        log::info!("Loaded {} allow-listed users from {}", users.len(), path.display());
        Self {
            path,
            users: Mutex::new(users.into_iter().collect()),
        }
    }

    /// Returns true if `user_id` is allow-listed.
    pub async fn contains(&self, user_id: i64) -> bool {
        self.users.lock().await.contains(&user_id)
    }

    /// Inserts `user_id` and persists. Returns `false` without rewriting the
    /// file if the ID was already present (idempotent add).
    pub async fn add(&self, user_id: i64) -> AppResult<bool> {
        let mut users = self.users.lock().await;
        if !users.insert(user_id) {
            return Ok(false);
        }
        self.persist(&users)?;
        Ok(true)
    }

    /// Removes `user_id` and persists. Returns `false` without rewriting the
    /// file if the ID was not present.
    pub async fn remove(&self, user_id: i64) -> AppResult<bool> {
        let mut users = self.users.lock().await;
        if !users.remove(&user_id) {
            return Ok(false);
        }
        self.persist(&users)?;
        Ok(true)
    }

    /// Returns all allow-listed IDs in ascending order.
    pub async fn list(&self) -> Vec<i64> {
        self.users.lock().await.iter().copied().collect()
    }

    fn persist(&self, users: &BTreeSet<i64>) -> AppResult<()> {
        let ordered: Vec<i64> = users.iter().copied().collect();
        save_json(&self.path, &ordered)
    }
}
