//! Audio normalization via ffmpeg.

use crate::config::ExtractionSettings;
use crate::error::ExtractionError;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Decodes `source` and writes signed 16-bit PCM WAV to `dest`.
///
/// Video streams are dropped; the audio is resampled to the configured rate and
/// downmixed to the configured channel count.
pub async fn transcode_to_wav(
    source: &Path,
    dest: &Path,
    settings: &ExtractionSettings,
) -> Result<(), ExtractionError> {
    debug!("Transcoding {:?} to WAV", source);

    let result = Command::new("ffmpeg")
        .arg("-nostdin")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-acodec").arg("pcm_s16le")
        .arg("-ar").arg(settings.sample_rate.to_string())
        .arg("-ac").arg(settings.channels.to_string())
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(ExtractionError::Transcode(format!("ffmpeg conversion failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(ExtractionError::Transcode(format!("ffmpeg error: {e}"))),
    }
}
