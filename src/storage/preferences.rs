//! Per-user preferences document
//!
//! Persisted as a JSON object keyed by stringified user ID in
//! `user_preferences.json`. Values are opaque JSON: the bot records what it
//! learns about a user (currently just the Telegram profile language) but
//! attaches no behavior to it yet. Same persistence discipline as the
//! allow-list: whole-file overwrite under the internal mutex.

use crate::core::error::AppResult;
use crate::storage::json::{load_json, save_json};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Thread-safe store for opaque per-user preference values.
pub struct PreferencesStore {
    path: PathBuf,
    prefs: Mutex<HashMap<String, Value>>,
}

impl PreferencesStore {
    /// Loads the store from `path`. A missing or malformed file yields an
    /// empty document.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefs: HashMap<String, Value> = load_json(&path, HashMap::new());
        log::info!("Loaded preferences for {} users from {}", prefs.len(), path.display());
        Self {
            path,
            prefs: Mutex::new(prefs),
        }
    }

    /// Returns the stored value for `user_id`, if any.
    pub async fn get(&self, user_id: i64) -> Option<Value> {
        self.prefs.lock().await.get(&user_id.to_string()).cloned()
    }

    /// Stores `value` for `user_id` and persists.
    pub async fn set(&self, user_id: i64, value: Value) -> AppResult<()> {
        let mut prefs = self.prefs.lock().await;
        prefs.insert(user_id.to_string(), value);
        save_json(&self.path, &*prefs)
    }
}
