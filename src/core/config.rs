use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration constants for the bot

/// Telegram bot credential
/// Read once at startup from the TELOXIDE_TOKEN environment variable.
/// Startup fails fatally if this is empty.
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| env::var("TELOXIDE_TOKEN").unwrap_or_default());

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// ffmpeg binary path, probed at startup (yt-dlp needs it for remuxing)
pub static FFMPEG_BIN: Lazy<String> = Lazy::new(|| env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()));

/// Data directory holding the persisted JSON documents and the downloads
/// scratch tree. Created at startup.
pub static DATA_DIR: Lazy<String> = Lazy::new(|| env::var("DATA_DIR").unwrap_or_else(|_| "tikgrab-data".to_string()));

/// Log file path
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "tikgrab.log".to_string()));

/// Path of the persisted allow-list document
pub fn allowed_users_path() -> PathBuf {
    PathBuf::from(&*DATA_DIR).join("allowed_users.json")
}

/// Path of the persisted per-user preferences document
pub fn user_preferences_path() -> PathBuf {
    PathBuf::from(&*DATA_DIR).join("user_preferences.json")
}

/// Scratch directory for transient downloaded files
pub fn downloads_dir() -> PathBuf {
    PathBuf::from(&*DATA_DIR).join("downloads")
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;

    /// Fallback operator identity when ADMIN_USER_ID is not set
    const DEFAULT_ADMIN_USER_ID: i64 = 6744885896;

    /// The single operator identity with administrative privileges.
    /// Implicitly authorized; never stored in the allow-list.
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        std::env::var("ADMIN_USER_ID")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_ADMIN_USER_ID)
    });
}

/// Queue processing configuration
pub mod queue {
    use super::Duration;

    /// Maximum number of concurrent downloads
    pub const MAX_CONCURRENT_DOWNLOADS: usize = 5;

    /// Interval between queue checks (in milliseconds)
    pub const CHECK_INTERVAL_MS: u64 = 100;

    /// Queue check interval duration
    pub fn check_interval() -> Duration {
        Duration::from_millis(CHECK_INTERVAL_MS)
    }
}

/// Download configuration
pub mod download {
    use super::Duration;

    /// Timeout for yt-dlp download commands (in seconds)
    pub const YTDLP_TIMEOUT_SECS: u64 = 120; // 2 minutes

    /// Timeout for metadata-only yt-dlp probes (in seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 30;

    /// yt-dlp download command timeout duration
    pub fn ytdlp_timeout() -> Duration {
        Duration::from_secs(YTDLP_TIMEOUT_SECS)
    }

    /// Metadata probe timeout duration
    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for the Telegram HTTP client (in seconds)
    /// Generous to accommodate large video uploads.
    pub const REQUEST_TIMEOUT_SECS: u64 = 900; // 15 minutes

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Validation configuration
pub mod validation {
    /// Maximum URL length (RFC 7230 recommends 8000, but we use 2048 for safety)
    pub const MAX_URL_LENGTH: usize = 2048;
}
