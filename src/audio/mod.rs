//! Audio extraction: video reference in, normalized PCM waveform out.
//!
//! Every extraction runs inside its own scratch directory under the configured work
//! root. Intermediate files (downloaded containers, materialized uploads) are removed
//! as soon as the transcode finishes, successful or not, and the scratch directory
//! itself is owned by the returned [`AudioAsset`]: dropping the asset deletes it.
//! On any error the scratch directory is dropped before returning, so no temporary
//! file outlives a failed extraction.

mod downloader;
mod transcode;

pub use downloader::download_audio;
pub use transcode::transcode_to_wav;

use crate::audio_source::{validate_local, validate_remote, VideoReference};
use crate::config::ExtractionSettings;
use crate::error::ExtractionError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// Name of the normalized waveform inside a scratch directory.
const OUTPUT_FILE: &str = "audio.wav";

/// Sample layout of an [`AudioAsset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Number of samples per channel.
    pub frames: u32,
}

impl AudioFormat {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

/// A 16-bit PCM WAV file owned by one pipeline invocation.
///
/// The file lives in a private scratch directory that is deleted when the asset is
/// dropped or [released](AudioAsset::release).
#[derive(Debug)]
pub struct AudioAsset {
    path: PathBuf,
    format: AudioFormat,
    scratch: TempDir,
}

impl AudioAsset {
    /// Adopt a WAV file living inside `scratch`.
    ///
    /// Fails unless the file is a readable 16-bit integer PCM WAV.
    pub fn from_wav(scratch: TempDir, path: PathBuf) -> Result<Self, ExtractionError> {
        let reader = hound::WavReader::open(&path)
            .map_err(|e| ExtractionError::InvalidAudio(format!("{}: {}", path.display(), e)))?;
        let spec = reader.spec();

        if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(ExtractionError::InvalidAudio(format!(
                "expected 16-bit integer PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        let format = AudioFormat {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            frames: reader.duration(),
        };

        Ok(Self {
            path,
            format,
            scratch,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Read the raw WAV bytes.
    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Read all samples, interleaved by channel.
    pub fn read_samples(&self) -> Result<Vec<i16>, ExtractionError> {
        let mut reader = hound::WavReader::open(&self.path)
            .map_err(|e| ExtractionError::InvalidAudio(e.to_string()))?;
        reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ExtractionError::InvalidAudio(e.to_string()))
    }

    /// Delete the asset and its scratch directory, reporting any filesystem error.
    pub fn release(self) -> std::io::Result<()> {
        self.scratch.close()
    }
}

/// Turns video references into [`AudioAsset`]s.
pub struct Extractor {
    settings: ExtractionSettings,
    work_root: PathBuf,
}

impl Extractor {
    /// Create an extractor whose scratch directories live under `work_root`.
    pub fn new(settings: ExtractionSettings, work_root: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            work_root: work_root.into(),
        }
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Resolve `reference` to a normalized waveform.
    #[instrument(skip(self), fields(reference = %reference))]
    pub async fn extract_audio(
        &self,
        reference: &VideoReference,
    ) -> Result<AudioAsset, ExtractionError> {
        match reference {
            VideoReference::RemoteUrl(url) => self.extract_remote(url).await,
            VideoReference::LocalPath(path) => self.extract_local(path).await,
        }
    }

    /// Normalize an uploaded video held in memory.
    ///
    /// The bytes are written to a scoped `.mp4` file that is removed after transcoding.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn extract_upload(&self, bytes: &[u8]) -> Result<AudioAsset, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::InvalidReference("Empty upload".to_string()));
        }
        if bytes.len() as u64 > self.settings.max_upload_bytes {
            return Err(ExtractionError::InvalidReference(format!(
                "Upload of {} bytes exceeds limit of {} bytes",
                bytes.len(),
                self.settings.max_upload_bytes
            )));
        }

        let scratch = self.scratch_dir()?;

        let mut upload = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".mp4")
            .tempfile_in(scratch.path())?;
        upload.write_all(bytes)?;
        upload.flush()?;

        let output = scratch.path().join(OUTPUT_FILE);
        let result = transcode_to_wav(upload.path(), &output, &self.settings).await;
        if let Err(e) = upload.close() {
            warn!("Failed to remove materialized upload: {}", e);
        }
        result?;

        self.finish(scratch, output)
    }

    async fn extract_remote(&self, raw_url: &str) -> Result<AudioAsset, ExtractionError> {
        let url = validate_remote(raw_url)?;
        let scratch = self.scratch_dir()?;

        let downloaded =
            download_audio(url.as_str(), scratch.path(), &self.settings.ytdlp_format).await?;

        let output = scratch.path().join(OUTPUT_FILE);
        let result = transcode_to_wav(&downloaded, &output, &self.settings).await;
        if let Err(e) = std::fs::remove_file(&downloaded) {
            warn!("Failed to remove downloaded container: {}", e);
        }
        result?;

        self.finish(scratch, output)
    }

    async fn extract_local(&self, path: &Path) -> Result<AudioAsset, ExtractionError> {
        validate_local(path, &self.settings.local_extensions)?;
        let scratch = self.scratch_dir()?;

        info!("Extracting audio from {}", path.display());
        let output = scratch.path().join(OUTPUT_FILE);
        transcode_to_wav(path, &output, &self.settings).await?;

        self.finish(scratch, output)
    }

    /// Create a fresh, uniquely named scratch directory for one extraction.
    fn scratch_dir(&self) -> Result<TempDir, ExtractionError> {
        std::fs::create_dir_all(&self.work_root)?;
        let dir = tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(&self.work_root)?;
        debug!("Scratch directory {:?}", dir.path());
        Ok(dir)
    }

    fn finish(&self, scratch: TempDir, output: PathBuf) -> Result<AudioAsset, ExtractionError> {
        let asset = AudioAsset::from_wav(scratch, output)?;
        let format = asset.format();

        if format.channels != self.settings.channels || format.sample_rate != self.settings.sample_rate {
            return Err(ExtractionError::InvalidAudio(format!(
                "expected {} Hz / {} channel(s), got {} Hz / {} channel(s)",
                self.settings.sample_rate, self.settings.channels, format.sample_rate, format.channels
            )));
        }

        info!("Extracted {:.1}s of audio", format.duration_seconds());
        Ok(asset)
    }
}
