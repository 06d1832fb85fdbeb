//! Error types for Vidquiz.

use thiserror::Error;

/// Library-level error type for Vidquiz operations.
#[derive(Error, Debug)]
pub enum VidquizError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Hard failures while turning a video reference into an audio asset.
///
/// These abort a pipeline run: without audio there is nothing to transcribe.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("invalid video reference: {0}")]
    InvalidReference(String),

    #[error("video not found: {0}")]
    NotFound(String),

    #[error("unsupported container: {0}")]
    UnsupportedContainer(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("transcode failed: {0}")]
    Transcode(String),

    #[error("invalid audio output: {0}")]
    InvalidAudio(String),

    #[error("external tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

/// Soft failure of the speech-recognition stage.
///
/// The `Display` output is the text shown in place of a transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("Could not understand audio.")]
    Unintelligible,

    #[error("API request failed: {0}")]
    Request(String),
}

/// Soft failure of the summarization stage.
///
/// The `Display` output is the text shown in place of a summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizationError {
    #[error("Failed to load summarizer: {0}")]
    ModelLoad(String),

    #[error("Summarization failed: {0}")]
    Inference(String),
}

/// Result type alias for Vidquiz operations.
pub type Result<T> = std::result::Result<T, VidquizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_sentinels() {
        assert_eq!(
            RecognitionError::Unintelligible.to_string(),
            "Could not understand audio."
        );
        assert_eq!(
            RecognitionError::Request("timeout".into()).to_string(),
            "API request failed: timeout"
        );
    }

    #[test]
    fn test_summarization_sentinels() {
        assert_eq!(
            SummarizationError::ModelLoad("missing weights".into()).to_string(),
            "Failed to load summarizer: missing weights"
        );
        assert_eq!(
            SummarizationError::Inference("oom".into()).to_string(),
            "Summarization failed: oom"
        );
    }

    #[test]
    fn test_extraction_error_wraps() {
        let err: VidquizError = ExtractionError::NotFound("clip.mp4".into()).into();
        assert!(matches!(err, VidquizError::Extraction(ExtractionError::NotFound(_))));
        assert_eq!(err.to_string(), "Audio extraction failed: video not found: clip.mp4");
    }
}
