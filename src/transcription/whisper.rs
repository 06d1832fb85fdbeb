//! OpenAI Whisper transcription implementation.

use super::{split_wav, Transcriber};
use crate::audio::AudioAsset;
use crate::config::{OpenAISettings, TranscriptionSettings};
use crate::error::{RecognitionError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
    chunk_duration_seconds: u32,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber from settings.
    pub fn with_config(settings: &TranscriptionSettings, openai: &OpenAISettings) -> Result<Self> {
        Ok(Self {
            client: create_client(openai)?,
            model: settings.model.clone(),
            language: settings.language.clone(),
            chunk_duration_seconds: settings.chunk_duration_seconds,
        })
    }

    /// Send one WAV payload and return its trimmed text.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn transcribe_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> std::result::Result<String, RecognitionError> {
        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(file_name.to_string(), bytes))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| RecognitionError::Request(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| RecognitionError::Request(e.to_string()))?;

        Ok(response.text.trim().to_string())
    }

    /// Split an asset longer than the chunk duration into WAV segments.
    fn segments(&self, asset: &AudioAsset) -> std::result::Result<Option<Vec<Vec<u8>>>, RecognitionError> {
        let format = asset.format();
        if self.chunk_duration_seconds == 0
            || format.duration_seconds() <= self.chunk_duration_seconds as f64
        {
            return Ok(None);
        }

        let samples = asset
            .read_samples()
            .map_err(|e| RecognitionError::Request(format!("Failed to read audio: {}", e)))?;
        let spec = hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
            sample_format: hound::SampleFormat::Int,
        };
        let chunk_frames = self.chunk_duration_seconds as usize * format.sample_rate as usize;

        split_wav(&samples, spec, chunk_frames)
            .map(Some)
            .map_err(|e| RecognitionError::Request(format!("Failed to segment audio: {}", e)))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self, asset), fields(model = %self.model))]
    async fn recognize(&self, asset: &AudioAsset) -> std::result::Result<String, RecognitionError> {
        let text = match self.segments(asset)? {
            None => {
                debug!("Transcribing whole asset");
                let bytes = asset
                    .read_bytes()
                    .await
                    .map_err(|e| RecognitionError::Request(format!("Failed to read audio: {}", e)))?;
                self.transcribe_bytes("audio.wav", bytes).await?
            }
            Some(segments) => {
                info!("Transcribing {} audio segments", segments.len());
                let mut parts = Vec::with_capacity(segments.len());
                for (idx, bytes) in segments.into_iter().enumerate() {
                    let part = self
                        .transcribe_bytes(&format!("audio_{:04}.wav", idx), bytes)
                        .await
                        .map_err(|e| match e {
                            RecognitionError::Request(detail) => {
                                RecognitionError::Request(format!("segment {}: {}", idx, detail))
                            }
                            other => other,
                        })?;
                    if !part.is_empty() {
                        parts.push(part);
                    }
                }
                parts.join(" ")
            }
        };

        if text.is_empty() {
            return Err(RecognitionError::Unintelligible);
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
