//! Speech-to-text transcription.
//!
//! Recognition itself returns a structured `Result`; [`transcribe`] wraps it into a
//! [`Transcript`] that always has displayable text, and releases the consumed audio.

mod segment;
mod whisper;

pub use segment::split_wav;
pub use whisper::WhisperTranscriber;

use crate::audio::AudioAsset;
use crate::error::RecognitionError;
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Trait for speech-recognition services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Recognize the whole asset as one text.
    async fn recognize(&self, asset: &AudioAsset) -> Result<String, RecognitionError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Result of the transcription stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcript {
    Recognized(String),
    Failed(RecognitionError),
}

impl Transcript {
    /// The recognized text, if recognition succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Transcript::Recognized(text) => Some(text),
            Transcript::Failed(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, Transcript::Recognized(_))
    }
}

impl From<Result<String, RecognitionError>> for Transcript {
    fn from(outcome: Result<String, RecognitionError>) -> Self {
        match outcome {
            Ok(text) => Transcript::Recognized(text),
            Err(e) => Transcript::Failed(e),
        }
    }
}

/// Renders the legacy display text: the transcript itself, or the failure sentinel.
impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transcript::Recognized(text) => f.write_str(text),
            Transcript::Failed(e) => write!(f, "{}", e),
        }
    }
}

/// Run `transcriber` over `asset`, consuming and releasing it.
///
/// Never fails: recognition errors become [`Transcript::Failed`].
#[instrument(skip_all, fields(transcriber = transcriber.name()))]
pub async fn transcribe(transcriber: &dyn Transcriber, asset: AudioAsset) -> Transcript {
    let outcome = transcriber.recognize(&asset).await;

    if let Err(e) = asset.release() {
        warn!("Failed to release audio asset: {}", e);
    }

    match &outcome {
        Ok(text) => info!("Recognized {} characters", text.len()),
        Err(e) => warn!("Recognition failed: {}", e),
    }

    outcome.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    struct FixedTranscriber(Result<String, RecognitionError>);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn recognize(&self, _asset: &AudioAsset) -> Result<String, RecognitionError> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn asset() -> (AudioAsset, std::path::PathBuf) {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().to_path_buf();
        let path = dir.join("a.wav");
        write_silence(&path);
        (AudioAsset::from_wav(scratch, path).unwrap(), dir)
    }

    fn write_silence(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..160 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[tokio::test]
    async fn test_success_is_verbatim() {
        let (asset, dir) = asset();
        let t = FixedTranscriber(Ok("hello there".to_string()));
        let transcript = transcribe(&t, asset).await;
        assert_eq!(transcript, Transcript::Recognized("hello there".to_string()));
        assert_eq!(transcript.to_string(), "hello there");
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_unintelligible_sentinel() {
        let (asset, dir) = asset();
        let t = FixedTranscriber(Err(RecognitionError::Unintelligible));
        let transcript = transcribe(&t, asset).await;
        assert!(!transcript.is_recognized());
        assert_eq!(transcript.text(), None);
        assert_eq!(transcript.to_string(), "Could not understand audio.");
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_request_failure_sentinel() {
        let (asset, dir) = asset();
        let t = FixedTranscriber(Err(RecognitionError::Request("connection reset".into())));
        let transcript = transcribe(&t, asset).await;
        assert_eq!(transcript.to_string(), "API request failed: connection reset");
        assert!(!dir.exists());
    }
}
