//! Pipeline orchestrator for Vidquiz.
//!
//! Runs one video through extraction, transcription, summarization and quiz
//! composition. Only extraction can fail the run; later stages degrade into
//! labeled failure outcomes.

use crate::audio::{AudioAsset, Extractor};
use crate::audio_source::VideoReference;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::quiz::{compose_from_summary, QuizOutcome};
use crate::summarization::{create_summarizer, summarize, Summarizer, Summary, SummaryStyle};
use crate::transcription::{transcribe, Transcriber, Transcript, WhisperTranscriber};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{field, info, instrument, Span};
use uuid::Uuid;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run_id: Uuid,
    /// Display form of the input: a path, a URL, or `upload`.
    pub source: String,
    pub style: SummaryStyle,
    pub processed_at: DateTime<Utc>,
    pub transcript: Transcript,
    pub summary: Summary,
    pub quiz: QuizOutcome,
}

/// The main orchestrator for the Vidquiz pipeline.
pub struct Orchestrator {
    settings: Settings,
    extractor: Extractor,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
}

impl Orchestrator {
    /// Create an orchestrator with the configured OpenAI/local backends.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::with_config(
            &settings.transcription,
            &settings.openai,
        )?);
        let summarizer = create_summarizer(&settings, prompts)?;

        info!(
            "Using {} for transcription and {} for summaries",
            transcriber.name(),
            summarizer.name()
        );

        Self::with_components(settings, transcriber, summarizer)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Result<Self> {
        let work_root = settings.temp_dir();
        std::fs::create_dir_all(&work_root)?;
        let extractor = Extractor::new(settings.extraction.clone(), work_root);

        Ok(Self {
            settings,
            extractor,
            transcriber,
            summarizer,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Process a local file or remote URL.
    #[instrument(skip(self), fields(run_id = field::Empty, reference = %reference, style = %style))]
    pub async fn process(
        &self,
        reference: &VideoReference,
        style: SummaryStyle,
    ) -> Result<PipelineOutput> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", field::display(run_id));

        let asset = self.extractor.extract_audio(reference).await?;
        Ok(self.run_stages(run_id, reference.to_string(), asset, style).await)
    }

    /// Process an uploaded video held in memory.
    #[instrument(skip(self, bytes), fields(run_id = field::Empty, size = bytes.len(), style = %style))]
    pub async fn process_upload(&self, bytes: &[u8], style: SummaryStyle) -> Result<PipelineOutput> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", field::display(run_id));

        let asset = self.extractor.extract_upload(bytes).await?;
        Ok(self.run_stages(run_id, "upload".to_string(), asset, style).await)
    }

    /// Transcribe, summarize and quiz an already extracted asset.
    async fn run_stages(
        &self,
        run_id: Uuid,
        source: String,
        asset: AudioAsset,
        style: SummaryStyle,
    ) -> PipelineOutput {
        let transcript = transcribe(self.transcriber.as_ref(), asset).await;

        // A failed transcript is summarized as its failure text.
        let window = style.window(&self.settings.summarization);
        let summary = summarize(
            self.summarizer.as_ref(),
            &transcript.to_string(),
            style,
            window,
        )
        .await;

        let quiz = compose_from_summary(&summary);
        info!(
            "Run complete: transcript {}, summary {}, quiz {}",
            if transcript.is_recognized() { "ok" } else { "failed" },
            if summary.is_generated() { "ok" } else { "failed" },
            if quiz.item().is_some() { "composed" } else { "too short" }
        );

        PipelineOutput {
            run_id,
            source,
            style,
            processed_at: Utc::now(),
            transcript,
            summary,
            quiz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractionError, RecognitionError, SummarizationError, VidquizError};
    use crate::summarization::LengthWindow;
    use async_trait::async_trait;

    struct NeverCalled;

    #[async_trait]
    impl Transcriber for NeverCalled {
        async fn recognize(&self, _asset: &AudioAsset) -> std::result::Result<String, RecognitionError> {
            panic!("transcriber must not run after a failed extraction");
        }

        fn name(&self) -> &str {
            "never"
        }
    }

    #[async_trait]
    impl Summarizer for NeverCalled {
        async fn summarize(
            &self,
            _text: &str,
            _style: SummaryStyle,
            _window: LengthWindow,
        ) -> std::result::Result<String, SummarizationError> {
            panic!("summarizer must not run after a failed extraction");
        }

        fn name(&self) -> &str {
            "never"
        }
    }

    fn orchestrator(root: &std::path::Path) -> Orchestrator {
        let mut settings = Settings::default();
        settings.general.temp_dir = root.join("work").to_string_lossy().to_string();
        Orchestrator::with_components(settings, Arc::new(NeverCalled), Arc::new(NeverCalled))
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());

        let err = orch
            .process(
                &VideoReference::local(dir.path().join("missing.mp4")),
                SummaryStyle::Concise,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VidquizError::Extraction(ExtractionError::NotFound(_))
        ));
        assert_eq!(std::fs::read_dir(orch.extractor().work_root()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());
        let err = orch.process_upload(&[], SummaryStyle::Detailed).await.unwrap_err();
        assert!(matches!(err, VidquizError::Extraction(_)));
    }

    #[test]
    fn test_work_root_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path());
        assert!(orch.extractor().work_root().is_dir());
    }
}
