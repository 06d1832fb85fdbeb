//! Remote URL validation.

use crate::error::ExtractionError;
use url::Url;

/// Parse a remote reference and check it is an absolute `http(s)` URL with a host.
pub fn validate_remote(raw: &str) -> Result<Url, ExtractionError> {
    let url = Url::parse(raw)
        .map_err(|e| ExtractionError::InvalidReference(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ExtractionError::InvalidReference(format!(
                "Unsupported URL scheme '{}': {}",
                other, raw
            )));
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ExtractionError::InvalidReference(format!(
            "URL has no host: {}",
            raw
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        let url = validate_remote("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(url.host_str(), Some("www.youtube.com"));
        assert!(validate_remote("http://example.com/video.mp4").is_ok());
    }

    #[test]
    fn test_invalid_urls() {
        assert!(matches!(
            validate_remote("https://"),
            Err(ExtractionError::InvalidReference(_))
        ));
        assert!(matches!(
            validate_remote("ftp://example.com/video.mp4"),
            Err(ExtractionError::InvalidReference(_))
        ));
        assert!(matches!(
            validate_remote("not a url"),
            Err(ExtractionError::InvalidReference(_))
        ));
    }
}
