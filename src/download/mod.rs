//! Download management: classification, queueing, workers, and delivery

pub mod metadata;
pub mod queue;
pub mod send;
pub mod worker;
pub mod ytdlp;

// Re-exports for convenience
pub use metadata::{classify, is_tiktok_url, MediaKind};
pub use queue::{DownloadKind, DownloadQueue, DownloadTask};
pub use send::deliver_artifact;
pub use worker::{download_media, Artifact};
