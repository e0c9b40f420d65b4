//! Startup probes for the external binaries
//!
//! The bot shells out to yt-dlp for every extraction and relies on ffmpeg
//! being present for remuxing and audio conversion. ffmpeg is probed fatally
//! at startup; the yt-dlp version is logged so a stale binary is visible in
//! the logs.

use crate::core::config;
use crate::core::error::AppError;
use std::process::Command;

/// Verifies that ffmpeg is discoverable by running `ffmpeg -version`.
///
/// Called once at startup. A missing or broken ffmpeg makes every remuxed
/// download fail later in confusing ways, so this is a fatal error.
pub fn ensure_ffmpeg_installed() -> Result<(), AppError> {
    let ffmpeg_bin = &*config::FFMPEG_BIN;

    let output = Command::new(ffmpeg_bin)
        .arg("-version")
        .output()
        .map_err(|e| AppError::Download(format!("ffmpeg ('{}') is not installed or not in PATH: {}", ffmpeg_bin, e)))?;

    if !output.status.success() {
        return Err(AppError::Download(format!(
            "ffmpeg ('{}') -version exited with status {}",
            ffmpeg_bin, output.status
        )));
    }

    let version_line = String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or("unknown")
        .to_string();
    log::info!("{}", version_line);

    Ok(())
}

/// Logs the current yt-dlp version.
///
/// Non-fatal: a missing binary is only logged here; the first download will
/// report the failure to the user.
pub fn log_ytdlp_version() {
    let ytdl_bin = &*config::YTDL_BIN;

    match Command::new(ytdl_bin).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::info!("yt-dlp version: {}", version);
        }
        Ok(output) => {
            log::warn!("yt-dlp --version exited with status {}", output.status);
        }
        Err(e) => {
            log::warn!(
                "Failed to run yt-dlp ('{}'): {}. Downloads will fail until it is installed.",
                ytdl_bin,
                e
            );
        }
    }
}
