//! Remote audio download via yt-dlp.

use crate::error::ExtractionError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// File stem used for the downloaded container inside a scratch directory.
const DOWNLOAD_STEM: &str = "download";

/// Downloads the audio of `url` into `scratch_dir` and returns the downloaded file.
///
/// yt-dlp selects the stream with `format` (e.g. `bestaudio/best`) and extracts it to a
/// WAV container. The returned file is an intermediate: the caller owns its removal.
/// No retries are attempted.
#[instrument(skip(scratch_dir))]
pub async fn download_audio(
    url: &str,
    scratch_dir: &Path,
    format: &str,
) -> Result<PathBuf, ExtractionError> {
    info!("Downloading audio from {}", url);

    let template = scratch_dir.join(format!("{}.%(ext)s", DOWNLOAD_STEM));

    let result = Command::new("yt-dlp")
        .arg("--format").arg(format)
        .arg("--extract-audio")
        .arg("--audio-format").arg("wav")
        .arg("--output").arg(&template)
        .arg("--print").arg("after_move:filepath")
        .arg("--no-playlist")
        .arg("--no-progress")
        .arg("--no-warnings")
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractionError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(ExtractionError::Download(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Download(format!("yt-dlp failed: {}", stderr.trim())));
    }

    let printed = String::from_utf8_lossy(&output.stdout);
    if let Some(path) = printed.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
        let path = PathBuf::from(path);
        if path.exists() {
            debug!("yt-dlp reported {:?}", path);
            return Ok(path);
        }
    }

    find_downloaded(scratch_dir)
}

/// Locates the downloaded container when yt-dlp did not print a usable path.
fn find_downloaded(dir: &Path) -> Result<PathBuf, ExtractionError> {
    let candidate = dir.join(format!("{}.wav", DOWNLOAD_STEM));
    if candidate.exists() {
        return Ok(candidate);
    }

    let prefix = format!("{}.", DOWNLOAD_STEM);
    for entry in std::fs::read_dir(dir)?.flatten() {
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            return Ok(entry.path());
        }
    }

    Err(ExtractionError::Download("Audio file not found after download".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_downloaded_prefers_wav() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("download.webm"), b"x").unwrap();
        std::fs::write(dir.path().join("download.wav"), b"x").unwrap();
        assert_eq!(find_downloaded(dir.path()).unwrap(), dir.path().join("download.wav"));
    }

    #[test]
    fn test_find_downloaded_any_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("download.m4a"), b"x").unwrap();
        assert_eq!(find_downloaded(dir.path()).unwrap(), dir.path().join("download.m4a"));
    }

    #[test]
    fn test_find_downloaded_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("other.wav"), b"x").unwrap();
        assert!(matches!(
            find_downloaded(dir.path()),
            Err(ExtractionError::Download(_))
        ));
    }
}
