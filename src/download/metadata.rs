//! Link admission and media-type classification
//!
//! A URL is first checked against the TikTok host pattern; nothing else ever
//! reaches yt-dlp. Classification runs a metadata-only `--dump-json` probe
//! and inspects the result: playable formats mean a video post, thumbnails
//! alone mean a photo post. Every failure mode (bad URL, timeout, non-zero
//! exit, unparsable output) collapses to `Undetermined` - this boundary is
//! pure classification and never raises to the caller.

use crate::core::config;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

/// Hosts accepted for classification, with or without scheme and `www.`
#[allow(clippy::expect_used)]
static TIKTOK_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?://)?(www\.)?(vm\.tiktok\.com|tiktok\.com)/").expect("valid TikTok host pattern"));

/// What a link resolves to, as far as delivery is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// A post with playable formats
    Video,
    /// A photo post (thumbnails but no playable formats)
    Image,
    /// Anything the probe could not make sense of
    Undetermined,
}

/// Returns true if `text` looks like a supported TikTok link.
///
/// This is the admission check that runs before any subprocess is spawned.
pub fn is_tiktok_url(text: &str) -> bool {
    text.len() <= config::validation::MAX_URL_LENGTH && TIKTOK_URL_RE.is_match(text)
}

/// Classifies `url` by probing yt-dlp metadata without downloading.
///
/// Unsupported hosts are rejected here as well, before any subprocess is
/// spawned, so the classifier is safe to call with arbitrary URLs.
pub async fn classify(url: &Url) -> MediaKind {
    if !is_tiktok_url(url.as_str()) {
        return MediaKind::Undetermined;
    }

    let probe = timeout(
        config::download::probe_timeout(),
        TokioCommand::new(&*config::YTDL_BIN)
            .args(["--dump-json", "--no-playlist", "--quiet", url.as_str()])
            .output(),
    )
    .await;

    let output = match probe {
        Ok(Ok(output)) if output.status.success() => output,
        Ok(Ok(output)) => {
            log::warn!(
                "yt-dlp metadata probe failed for {} (exit code {:?})",
                url,
                output.status.code()
            );
            return MediaKind::Undetermined;
        }
        Ok(Err(e)) => {
            log::error!("Failed to run yt-dlp metadata probe for {}: {}", url, e);
            return MediaKind::Undetermined;
        }
        Err(_) => {
            log::warn!("yt-dlp metadata probe timed out for {}", url);
            return MediaKind::Undetermined;
        }
    };

    let info: serde_json::Value = match serde_json::from_slice(&output.stdout) {
        Ok(info) => info,
        Err(e) => {
            log::warn!("Unparsable yt-dlp metadata for {}: {}", url, e);
            return MediaKind::Undetermined;
        }
    };

    classify_info(&info)
}

/// Decides the media kind from a parsed yt-dlp metadata document.
fn classify_info(info: &serde_json::Value) -> MediaKind {
    let has_entries = |field: &str| {
        info.get(field)
            .and_then(|v| v.as_array())
            .is_some_and(|entries| !entries.is_empty())
    };

    if has_entries("formats") {
        MediaKind::Video
    } else if has_entries("thumbnails") {
        MediaKind::Image
    } else {
        MediaKind::Undetermined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_accepts_tiktok_hosts() {
        assert!(is_tiktok_url("https://www.tiktok.com/@x/video/123"));
        assert!(is_tiktok_url("http://tiktok.com/@x/video/123"));
        assert!(is_tiktok_url("tiktok.com/@x/video/123"));
        assert!(is_tiktok_url("https://vm.tiktok.com/ZMabcdef/"));
        assert!(is_tiktok_url("vm.tiktok.com/ZMabcdef/"));
        assert!(is_tiktok_url("www.tiktok.com/@x/photo/456"));
    }

    #[test]
    fn test_rejects_everything_else() {
        assert!(!is_tiktok_url("https://www.youtube.com/watch?v=abc"));
        assert!(!is_tiktok_url("hello there"));
        assert!(!is_tiktok_url(""));
        // A TikTok host buried in a foreign URL must not be admitted.
        assert!(!is_tiktok_url("https://evil.com/tiktok.com/@x/video/123"));
        assert!(!is_tiktok_url("https://tiktok.com.evil.com/@x/video/123"));
    }

    #[test]
    fn test_rejects_oversized_input() {
        let long = format!("https://www.tiktok.com/{}", "a".repeat(4096));
        assert!(!is_tiktok_url(&long));
    }

    #[tokio::test]
    async fn test_classify_rejects_foreign_hosts_without_probing() {
        // Returns immediately from the admission check; no subprocess runs.
        let url = Url::parse("https://www.youtube.com/watch?v=abc").unwrap();
        assert_eq!(classify(&url).await, MediaKind::Undetermined);
    }

    #[test]
    fn test_classify_info_video_when_formats_present() {
        let info = json!({"formats": [{"format_id": "0"}], "thumbnails": [{"url": "x"}]});
        assert_eq!(classify_info(&info), MediaKind::Video);
    }

    #[test]
    fn test_classify_info_image_when_only_thumbnails() {
        let info = json!({"thumbnails": [{"url": "x"}]});
        assert_eq!(classify_info(&info), MediaKind::Image);
    }

    #[test]
    fn test_classify_info_undetermined_otherwise() {
        assert_eq!(classify_info(&json!({})), MediaKind::Undetermined);
        assert_eq!(classify_info(&json!({"formats": []})), MediaKind::Undetermined);
        assert_eq!(classify_info(&json!({"thumbnails": []})), MediaKind::Undetermined);
        assert_eq!(classify_info(&json!({"formats": "nope"})), MediaKind::Undetermined);
    }
}
