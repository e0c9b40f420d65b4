//! Download task queue
//!
//! Tasks are processed FIFO by the worker pool in `main::process_queue`.
//! The queue is capacity-capped and deduplicates on (url, chat, kind) so a
//! user mashing the same button does not trigger repeated downloads.

use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use teloxide::types::ChatId;
use tokio::sync::Mutex;
use url::Url;

/// Maximum number of tasks allowed in the queue to prevent unbounded memory growth.
const MAX_QUEUE_SIZE: usize = 100;

/// What the user asked to download, decoded from the callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadKind {
    /// Best combined video+audio, merged to mp4
    VideoHd,
    /// Best audio-only stream, extracted to mp3
    Audio,
    /// Every image of a photo post
    Image,
}

impl DownloadKind {
    /// Parses the choice half of a `choice|url` callback token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "video_hd" => Some(DownloadKind::VideoHd),
            "audio" => Some(DownloadKind::Audio),
            "image" => Some(DownloadKind::Image),
            _ => None,
        }
    }

    /// The choice half of the callback token for this kind.
    pub fn as_token(self) -> &'static str {
        match self {
            DownloadKind::VideoHd => "video_hd",
            DownloadKind::Audio => "audio",
            DownloadKind::Image => "image",
        }
    }
}

/// A single download request, created from a button press.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Unique task identifier (UUID)
    pub id: String,
    /// Source URL for the download
    pub url: Url,
    /// User's Telegram chat ID
    pub chat_id: ChatId,
    /// Requested media kind
    pub kind: DownloadKind,
    /// Task creation timestamp
    pub created_at: DateTime<Utc>,
}

impl DownloadTask {
    /// Creates a new download task with a fresh UUID.
    pub fn new(url: Url, chat_id: ChatId, kind: DownloadKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url,
            chat_id,
            kind,
            created_at: Utc::now(),
        }
    }

    fn dedup_key(&self) -> (String, i64, DownloadKind) {
        (self.url.to_string(), self.chat_id.0, self.kind)
    }
}

/// Thread-safe FIFO queue for download tasks.
pub struct DownloadQueue {
    queue: Mutex<VecDeque<DownloadTask>>,
    /// Set of active tasks (queued + being processed), keyed by
    /// (url, chat_id, kind) to prevent duplicates.
    active: Mutex<HashSet<(String, i64, DownloadKind)>>,
}

impl Default for DownloadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Enqueues a task. Returns `false` if an identical task is already
    /// queued or being processed, or if the queue is full.
    pub async fn add_task(&self, task: DownloadTask) -> bool {
        let key = task.dedup_key();

        let mut active = self.active.lock().await;
        if active.contains(&key) {
            log::warn!(
                "Duplicate task for url '{}', chat {} and kind {:?}. Skipping.",
                task.url,
                task.chat_id.0,
                task.kind
            );
            return false;
        }

        let mut queue = self.queue.lock().await;
        if queue.len() >= MAX_QUEUE_SIZE {
            log::warn!("Queue is full ({} tasks), rejecting task for {}", queue.len(), task.url);
            return false;
        }

        active.insert(key);
        log::info!("Queued task {} ({:?} {})", task.id, task.kind, task.url);
        queue.push_back(task);
        true
    }

    /// Pops the oldest task, if any.
    pub async fn get_task(&self) -> Option<DownloadTask> {
        self.queue.lock().await.pop_front()
    }

    /// Releases a task's slot in the dedup set. Must be called after the
    /// task finishes processing, successfully or not, so the user can retry.
    pub async fn remove_active(&self, task: &DownloadTask) {
        let mut active = self.active.lock().await;
        if !active.remove(&task.dedup_key()) {
            log::warn!("Tried to release a task that was not active: {}", task.id);
        }
    }

    /// Current number of queued (not yet started) tasks.
    pub async fn size(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task(url: &str, chat: i64, kind: DownloadKind) -> DownloadTask {
        DownloadTask::new(Url::parse(url).unwrap(), ChatId(chat), kind)
    }

    #[test]
    fn test_kind_token_round_trip() {
        for kind in [DownloadKind::VideoHd, DownloadKind::Audio, DownloadKind::Image] {
            assert_eq!(DownloadKind::from_token(kind.as_token()), Some(kind));
        }
        assert_eq!(DownloadKind::from_token("video"), None);
        assert_eq!(DownloadKind::from_token(""), None);
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = DownloadQueue::new();
        assert!(queue.add_task(task("https://tiktok.com/@a/video/1", 1, DownloadKind::VideoHd)).await);
        assert!(queue.add_task(task("https://tiktok.com/@a/video/2", 1, DownloadKind::VideoHd)).await);

        assert_eq!(queue.get_task().await.unwrap().url.as_str(), "https://tiktok.com/@a/video/1");
        assert_eq!(queue.get_task().await.unwrap().url.as_str(), "https://tiktok.com/@a/video/2");
        assert!(queue.get_task().await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_task_is_skipped() {
        let queue = DownloadQueue::new();
        let first = task("https://tiktok.com/@a/video/1", 1, DownloadKind::Audio);
        let dup = task("https://tiktok.com/@a/video/1", 1, DownloadKind::Audio);

        assert!(queue.add_task(first).await);
        assert!(!queue.add_task(dup).await);
        assert_eq!(queue.size().await, 1);
    }

    #[tokio::test]
    async fn test_same_url_different_kind_is_not_a_duplicate() {
        let queue = DownloadQueue::new();
        assert!(queue.add_task(task("https://tiktok.com/@a/video/1", 1, DownloadKind::VideoHd)).await);
        assert!(queue.add_task(task("https://tiktok.com/@a/video/1", 1, DownloadKind::Audio)).await);
        assert_eq!(queue.size().await, 2);
    }

    #[tokio::test]
    async fn test_release_allows_requeue() {
        let queue = DownloadQueue::new();
        let first = task("https://tiktok.com/@a/video/1", 1, DownloadKind::VideoHd);
        assert!(queue.add_task(first.clone()).await);

        let popped = queue.get_task().await.unwrap();
        queue.remove_active(&popped).await;

        let retry = task("https://tiktok.com/@a/video/1", 1, DownloadKind::VideoHd);
        assert!(queue.add_task(retry).await);
    }

    #[tokio::test]
    async fn test_queue_capacity_is_bounded() {
        let queue = DownloadQueue::new();
        for i in 0..MAX_QUEUE_SIZE {
            let url = format!("https://tiktok.com/@a/video/{}", i);
            assert!(queue.add_task(task(&url, i as i64, DownloadKind::VideoHd)).await);
        }
        let overflow = task("https://tiktok.com/@a/video/overflow", 9999, DownloadKind::VideoHd);
        assert!(!queue.add_task(overflow).await);
        assert_eq!(queue.size().await, MAX_QUEUE_SIZE);
    }
}
