//! Local file validation.

use crate::error::ExtractionError;
use std::path::Path;

/// Check that `path` is an existing file whose extension belongs to `allowed_extensions`.
///
/// Extensions are compared case-insensitively.
pub fn validate_local(path: &Path, allowed_extensions: &[String]) -> Result<(), ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::NotFound(path.display().to_string()));
    }

    if !path.is_file() {
        return Err(ExtractionError::InvalidReference(format!(
            "Not a file: {}",
            path.display()
        )));
    }

    if !has_allowed_extension(path, allowed_extensions) {
        return Err(ExtractionError::UnsupportedContainer(format!(
            "{} (expected one of: {})",
            path.display(),
            allowed_extensions.join(", ")
        )));
    }

    Ok(())
}

fn has_allowed_extension(path: &Path, allowed_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mp4_family() -> Vec<String> {
        vec!["mp4".to_string(), "m4v".to_string(), "mov".to_string()]
    }

    #[test]
    fn test_has_allowed_extension() {
        assert!(has_allowed_extension(Path::new("video.mp4"), &mp4_family()));
        assert!(has_allowed_extension(Path::new("/a/b/VIDEO.MP4"), &mp4_family()));
        assert!(has_allowed_extension(Path::new("clip.mov"), &mp4_family()));
        assert!(!has_allowed_extension(Path::new("video.mkv"), &mp4_family()));
        assert!(!has_allowed_extension(Path::new("noext"), &mp4_family()));
    }

    #[test]
    fn test_missing_file() {
        let err = validate_local(Path::new("/definitely/not/here.mp4"), &mp4_family()).unwrap_err();
        assert!(matches!(err, ExtractionError::NotFound(_)));
    }

    #[test]
    fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_local(dir.path(), &mp4_family()).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidReference(_)));
    }

    #[test]
    fn test_wrong_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie.avi");
        std::fs::write(&path, b"not really a video").unwrap();
        let err = validate_local(&path, &mp4_family()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedContainer(_)));
    }

    #[test]
    fn test_existing_mp4_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie.mp4");
        std::fs::write(&path, b"bytes").unwrap();
        assert!(validate_local(&path, &mp4_family()).is_ok());
    }
}
