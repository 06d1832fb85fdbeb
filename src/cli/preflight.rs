//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting a run that would otherwise fail midway.

use crate::config::{Settings, SummarizerProvider};
use crate::error::{ExtractionError, Result, VidquizError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Local files need ffmpeg and the recognition service.
    ProcessLocal,
    /// Remote URLs additionally need yt-dlp.
    ProcessRemote,
    /// The server may receive either kind of input.
    Serve,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_api_key()?;
    check_summarizer(settings)?;
    check_tool("ffmpeg")?;
    match operation {
        Operation::ProcessLocal => {}
        Operation::ProcessRemote | Operation::Serve => check_tool("yt-dlp")?,
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(VidquizError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(VidquizError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check that the configured summarizer was compiled in.
fn check_summarizer(settings: &Settings) -> Result<()> {
    if settings.summarization.provider == SummarizerProvider::T5
        && !cfg!(feature = "local-summarizer")
    {
        return Err(VidquizError::Config(
            "summarization.provider is 't5' but this build lacks the 'local-summarizer' feature"
                .to_string(),
        ));
    }
    Ok(())
}

/// Check if an external tool is available.
pub(crate) fn check_tool(name: &str) -> Result<()> {
    // ffmpeg uses -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(ExtractionError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(name.to_string()).into())
        }
        Err(e) => Err(ExtractionError::ToolNotFound(format!("{}: {}", name, e)).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let err = check_tool("vidquiz-no-such-tool").unwrap_err();
        assert!(matches!(
            err,
            VidquizError::Extraction(ExtractionError::ToolNotFound(_))
        ));
    }

    #[test]
    fn test_openai_summarizer_always_available() {
        assert!(check_summarizer(&Settings::default()).is_ok());
    }
}
