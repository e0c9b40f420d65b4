//! Download workers
//!
//! Each worker invokes yt-dlp to materialize the requested media under a
//! scratch path that is generated before the process is spawned, so
//! concurrent downloads never contend on a filename. The only success
//! criterion checked afterwards is that the output exists; a failed run
//! cleans up whatever partial files yt-dlp left behind.

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::download::queue::{DownloadKind, DownloadTask};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

/// A materialized download, handed to the delivery path.
///
/// Whoever receives an `Artifact` owns its scratch files and is responsible
/// for deleting them after the send attempt.
#[derive(Debug)]
pub enum Artifact {
    /// A single video file
    Video(PathBuf),
    /// A single audio file
    Audio(PathBuf),
    /// The images of a photo post, all inside `dir`
    Photos { dir: PathBuf, files: Vec<PathBuf> },
}

/// Generates a collision-free scratch path for `kind`.
///
/// Video and audio get a kind-prefixed file; photo posts get a whole
/// directory since one post can expand into several images.
pub fn scratch_path(kind: DownloadKind) -> PathBuf {
    let unique = uuid::Uuid::new_v4();
    let name = match kind {
        DownloadKind::VideoHd => format!("video_{}.mp4", unique),
        DownloadKind::Audio => format!("audio_{}.mp3", unique),
        DownloadKind::Image => format!("images_{}", unique),
    };
    config::downloads_dir().join(name)
}

/// yt-dlp format selector for a video download.
pub fn video_format(high_quality: bool) -> &'static str {
    if high_quality {
        "bestvideo+bestaudio/best"
    } else {
        "best"
    }
}

/// Downloads the media requested by `task` and returns the artifact.
pub async fn download_media(task: &DownloadTask) -> AppResult<Artifact> {
    match task.kind {
        DownloadKind::VideoHd => download_video(&task.url, true).await.map(Artifact::Video),
        DownloadKind::Audio => download_audio(&task.url).await.map(Artifact::Audio),
        DownloadKind::Image => download_images(&task.url).await,
    }
}

/// Downloads a video to a fresh scratch file.
///
/// `high_quality` requests the best combined video+audio format merged to
/// mp4; otherwise the platform's best default format is used.
pub async fn download_video(url: &Url, high_quality: bool) -> AppResult<PathBuf> {
    let path = scratch_path(DownloadKind::VideoHd);
    let path_str = path.to_string_lossy().to_string();

    let mut args: Vec<&str> = vec![
        "-o",
        &path_str,
        "--quiet",
        "--no-progress",
        "--no-playlist",
        "--format",
        video_format(high_quality),
    ];
    if high_quality {
        args.extend_from_slice(&["--merge-output-format", "mp4"]);
    }
    args.push(url.as_str());

    run_ytdlp(&args).await.inspect_err(|_| cleanup_partial(&path))?;

    if !path.exists() {
        cleanup_partial(&path);
        return Err(AppError::Download(format!("yt-dlp produced no output file for {}", url)));
    }
    Ok(path)
}

/// Downloads the best audio-only stream and extracts it to an mp3 file.
pub async fn download_audio(url: &Url) -> AppResult<PathBuf> {
    let path = scratch_path(DownloadKind::Audio);
    let path_str = path.to_string_lossy().to_string();

    let args = [
        "-o",
        &path_str,
        "--quiet",
        "--no-progress",
        "--no-playlist",
        "--format",
        "bestaudio/best",
        "--extract-audio",
        "--audio-format",
        "mp3",
        url.as_str(),
    ];

    run_ytdlp(&args).await.inspect_err(|_| cleanup_partial(&path))?;

    if !path.exists() {
        cleanup_partial(&path);
        return Err(AppError::Download(format!("yt-dlp produced no audio file for {}", url)));
    }
    Ok(path)
}

/// Downloads every image of a photo post into a fresh scratch directory.
pub async fn download_images(url: &Url) -> AppResult<Artifact> {
    let dir = scratch_path(DownloadKind::Image);
    fs::create_dir_all(&dir)?;
    // No --no-playlist here: a photo post expands into one entry per image.
    let template = dir.join("%(autonumber)02d.%(ext)s").to_string_lossy().to_string();

    let args = ["-o", &template, "--quiet", "--no-progress", url.as_str()];

    if let Err(e) = run_ytdlp(&args).await {
        let _ = fs::remove_dir_all(&dir);
        return Err(e);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        let _ = fs::remove_dir_all(&dir);
        return Err(AppError::Download(format!("yt-dlp produced no images for {}", url)));
    }
    Ok(Artifact::Photos { dir, files })
}

/// Runs yt-dlp with `args` under the configured timeout.
async fn run_ytdlp(args: &[&str]) -> AppResult<()> {
    let ytdl_bin = &*config::YTDL_BIN;

    let result = timeout(
        config::download::ytdlp_timeout(),
        TokioCommand::new(ytdl_bin).args(args).output(),
    )
    .await;

    match result {
        Ok(Ok(output)) if output.status.success() => Ok(()),
        Ok(Ok(output)) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!(
                "yt-dlp exited with status {:?}: {}",
                output.status.code(),
                stderr.lines().last().unwrap_or("no output")
            );
            Err(AppError::Download(format!(
                "yt-dlp exited with status {:?}",
                output.status.code()
            )))
        }
        Ok(Err(e)) => {
            log::error!("Failed to spawn yt-dlp ('{}'): {}", ytdl_bin, e);
            Err(AppError::Download(format!("Failed to spawn yt-dlp: {}", e)))
        }
        Err(_) => {
            log::error!(
                "yt-dlp timed out after {} seconds",
                config::download::YTDLP_TIMEOUT_SECS
            );
            Err(AppError::Download("yt-dlp timed out".to_string()))
        }
    }
}

/// Removes a failed download's output file and yt-dlp's `.part` leftovers.
fn cleanup_partial(path: &Path) {
    for candidate in [path.to_path_buf(), PathBuf::from(format!("{}.part", path.display()))] {
        if candidate.exists() {
            if let Err(e) = fs::remove_file(&candidate) {
                log::warn!("Failed to remove partial file {}: {}", candidate.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_scratch_paths_are_kind_prefixed() {
        let video = scratch_path(DownloadKind::VideoHd);
        let audio = scratch_path(DownloadKind::Audio);
        let images = scratch_path(DownloadKind::Image);

        assert!(video.file_name().unwrap().to_string_lossy().starts_with("video_"));
        assert!(video.extension().unwrap() == "mp4");
        assert!(audio.file_name().unwrap().to_string_lossy().starts_with("audio_"));
        assert!(audio.extension().unwrap() == "mp3");
        assert!(images.file_name().unwrap().to_string_lossy().starts_with("images_"));
    }

    #[test]
    fn test_scratch_paths_do_not_collide() {
        let paths: HashSet<PathBuf> = (0..100).map(|_| scratch_path(DownloadKind::VideoHd)).collect();
        assert_eq!(paths.len(), 100);
    }

    #[test]
    fn test_video_format_mapping() {
        assert_eq!(video_format(true), "bestvideo+bestaudio/best");
        assert_eq!(video_format(false), "best");
    }

    #[test]
    fn test_cleanup_partial_removes_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video_test.mp4");
        let part = dir.path().join("video_test.mp4.part");
        std::fs::write(&path, b"partial").unwrap();
        std::fs::write(&part, b"fragment").unwrap();

        cleanup_partial(&path);
        assert!(!path.exists());
        assert!(!part.exists());
    }
}
