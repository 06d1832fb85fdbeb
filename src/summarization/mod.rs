//! Transcript summarization.
//!
//! A [`Summarizer`] is any deterministic abstractive model that accepts a soft
//! min/max length window. The OpenAI chat backend is always available; the local T5
//! backend needs the `local-summarizer` feature.

mod openai;
#[cfg(feature = "local-summarizer")]
mod t5;

pub use openai::ChatSummarizer;
#[cfg(feature = "local-summarizer")]
pub use t5::T5Summarizer;

use crate::config::{Prompts, Settings, SummarizationSettings, SummarizerProvider};
use crate::error::{Result, SummarizationError, VidquizError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Requested summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    #[default]
    Concise,
    Detailed,
}

impl SummaryStyle {
    /// The configured length window for this style.
    pub fn window(self, settings: &SummarizationSettings) -> LengthWindow {
        let w = match self {
            SummaryStyle::Concise => settings.concise,
            SummaryStyle::Detailed => settings.detailed,
        };
        LengthWindow::new(w.min_length, w.max_length)
    }
}

impl std::str::FromStr for SummaryStyle {
    type Err = VidquizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "concise" => Ok(SummaryStyle::Concise),
            "detailed" => Ok(SummaryStyle::Detailed),
            _ => Err(VidquizError::Config(format!(
                "Unknown summary style: '{}'. Use concise or detailed.",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryStyle::Concise => write!(f, "concise"),
            SummaryStyle::Detailed => write!(f, "detailed"),
        }
    }
}

/// Soft target length for a summary, in model-specific units (words or tokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthWindow {
    pub min: u32,
    pub max: u32,
}

impl LengthWindow {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Trait for summarization backends.
///
/// Implementations must be deterministic: identical text, style and window give
/// identical output for a fixed model version.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        text: &str,
        style: SummaryStyle,
        window: LengthWindow,
    ) -> std::result::Result<String, SummarizationError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Result of the summarization stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Generated(String),
    Failed(SummarizationError),
}

impl Summary {
    /// The generated text, if summarization succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Summary::Generated(text) => Some(text),
            Summary::Failed(_) => None,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, Summary::Generated(_))
    }
}

impl From<std::result::Result<String, SummarizationError>> for Summary {
    fn from(outcome: std::result::Result<String, SummarizationError>) -> Self {
        match outcome {
            Ok(text) => Summary::Generated(text),
            Err(e) => Summary::Failed(e),
        }
    }
}

/// Renders the legacy display text: the summary itself, or the failure description.
impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Summary::Generated(text) => f.write_str(text),
            Summary::Failed(e) => write!(f, "{}", e),
        }
    }
}

/// Summarize `text`. Never fails: backend errors become [`Summary::Failed`].
#[instrument(skip(summarizer, text), fields(summarizer = summarizer.name(), chars = text.len()))]
pub async fn summarize(
    summarizer: &dyn Summarizer,
    text: &str,
    style: SummaryStyle,
    window: LengthWindow,
) -> Summary {
    if text.trim().is_empty() {
        warn!("Nothing to summarize");
        return Summary::Failed(SummarizationError::Inference("empty input text".to_string()));
    }

    let outcome = summarizer.summarize(text, style, window).await;
    match &outcome {
        Ok(summary) => info!("Summary has {} characters", summary.len()),
        Err(e) => warn!("{}", e),
    }
    outcome.into()
}

/// Build the configured summarization backend.
pub fn create_summarizer(settings: &Settings, prompts: Prompts) -> Result<Arc<dyn Summarizer>> {
    match settings.summarization.provider {
        SummarizerProvider::OpenAI => Ok(Arc::new(ChatSummarizer::with_config(
            &settings.summarization,
            &settings.openai,
            prompts,
        )?)),
        #[cfg(feature = "local-summarizer")]
        SummarizerProvider::T5 => Ok(Arc::new(T5Summarizer::new(settings.summarization.t5.clone()))),
        #[cfg(not(feature = "local-summarizer"))]
        SummarizerProvider::T5 => Err(VidquizError::Config(
            "The t5 summarizer requires building with the 'local-summarizer' feature".to_string(),
        )),
    }
}
