//! Artifact delivery
//!
//! Sends a downloaded artifact to the user as the matching attachment type
//! and removes the scratch file(s) afterwards. Cleanup is unconditional:
//! the file is gone whether the send succeeded or not, so scratch storage
//! never accumulates.

use crate::core::error::{AppError, AppResult};
use crate::download::worker::Artifact;
use std::fs;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto};

/// Telegram caps media groups at ten items per message.
const MAX_ALBUM_SIZE: usize = 10;

/// Sends `artifact` to `chat_id`, then deletes its scratch files.
pub async fn deliver_artifact(bot: &Bot, chat_id: ChatId, artifact: &Artifact) -> AppResult<()> {
    let result = match artifact {
        Artifact::Video(path) => bot.send_video(chat_id, InputFile::file(path)).await.map(|_| ()),
        Artifact::Audio(path) => bot.send_audio(chat_id, InputFile::file(path)).await.map(|_| ()),
        Artifact::Photos { files, .. } => {
            if files.len() > MAX_ALBUM_SIZE {
                log::warn!(
                    "Photo post has {} images; sending the first {}",
                    files.len(),
                    MAX_ALBUM_SIZE
                );
            }
            let media: Vec<InputMedia> = files
                .iter()
                .take(MAX_ALBUM_SIZE)
                .map(|path| InputMedia::Photo(InputMediaPhoto::new(InputFile::file(path))))
                .collect();
            bot.send_media_group(chat_id, media).await.map(|_| ())
        }
    };

    // The artifact is spent either way.
    cleanup_artifact(artifact);

    result.map_err(AppError::from)
}

/// Removes an artifact's scratch files from disk.
pub fn cleanup_artifact(artifact: &Artifact) {
    match artifact {
        Artifact::Video(path) | Artifact::Audio(path) => remove_scratch_file(path),
        Artifact::Photos { dir, .. } => {
            if let Err(e) = fs::remove_dir_all(dir) {
                log::warn!("Failed to remove scratch directory {}: {}", dir.display(), e);
            }
        }
    }
}

fn remove_scratch_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        log::warn!("Failed to remove scratch file {}: {}", path.display(), e);
    }
}
