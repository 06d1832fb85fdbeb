//! Configuration module for Vidquiz.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts};
pub use settings::{
    ExtractionSettings, GeneralSettings, OpenAISettings, PromptSettings, ServerSettings, Settings,
    SummarizationSettings, SummarizerProvider, T5Settings, TranscriptionSettings, WindowSettings,
};
