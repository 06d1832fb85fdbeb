//! Video references and their validation.
//!
//! A reference is either a local file path or a remote `http(s)://` URL handled by a
//! streaming-site downloader. Anything that does not start with a web scheme is a path.

mod local;
mod remote;

pub use local::validate_local;
pub use remote::validate_remote;

use std::path::{Path, PathBuf};

/// Caller-supplied pointer to a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoReference {
    LocalPath(PathBuf),
    RemoteUrl(String),
}

impl VideoReference {
    /// Classify raw user input.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.starts_with("http://") || input.starts_with("https://") {
            VideoReference::RemoteUrl(input.to_string())
        } else {
            VideoReference::LocalPath(PathBuf::from(input))
        }
    }

    /// Build a reference to a local file.
    pub fn local(path: impl AsRef<Path>) -> Self {
        VideoReference::LocalPath(path.as_ref().to_path_buf())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, VideoReference::RemoteUrl(_))
    }
}

impl std::str::FromStr for VideoReference {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoReference::LocalPath(path) => write!(f, "{}", path.display()),
            VideoReference::RemoteUrl(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote() {
        assert_eq!(
            VideoReference::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            VideoReference::RemoteUrl("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );
        assert!(VideoReference::parse("  http://example.com/v.mp4 ").is_remote());
    }

    #[test]
    fn test_parse_everything_else_is_local() {
        assert_eq!(
            VideoReference::parse("lecture.mp4"),
            VideoReference::LocalPath(PathBuf::from("lecture.mp4"))
        );
        // No scheme, bare host, other schemes: all treated as paths.
        assert!(!VideoReference::parse("youtube.com/watch?v=abc").is_remote());
        assert!(!VideoReference::parse("ftp://host/video.mp4").is_remote());
        assert!(!VideoReference::parse("httpx://host").is_remote());
    }

    #[test]
    fn test_display_is_input_form() {
        let reference: VideoReference = " https://x.test/v ".parse().unwrap();
        assert_eq!(reference.to_string(), "https://x.test/v");
        assert_eq!(VideoReference::local("talks/a.mp4").to_string(), "talks/a.mp4");
    }
}
