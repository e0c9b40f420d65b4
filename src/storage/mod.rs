//! Persisted JSON documents: the allow-list and per-user preferences

pub mod allowlist;
pub mod json;
pub mod preferences;

// Re-exports for convenience
pub use allowlist::AllowlistStore;
pub use json::{load_json, save_json};
pub use preferences::PreferencesStore;
