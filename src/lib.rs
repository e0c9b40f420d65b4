//! tikgrab - Telegram bot for downloading TikTok media
//!
//! This library provides all the functionality of the tikgrab bot:
//! link classification, download management, the allow-list store,
//! and Telegram bot integration.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, and logging
//! - `storage`: the two persisted JSON documents (allow-list, preferences)
//! - `download`: yt-dlp probing, classification, queue, workers, delivery
//! - `telegram`: bot commands, dispatcher schema, admin console

pub mod core;
pub mod download;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use download::{DownloadKind, DownloadQueue, DownloadTask, MediaKind};
pub use storage::{AllowlistStore, PreferencesStore};
