//! Vidquiz - Video to transcript, summary and quiz
//!
//! A small pipeline that turns a video (local file or streaming-site URL) into a
//! transcript, a summary, and a single multiple-choice quiz question.
//!
//! # Overview
//!
//! Data flows strictly forward through four stages:
//!
//! 1. Audio extraction: a video reference becomes a mono 16 kHz PCM waveform
//! 2. Transcription: the waveform becomes text (or a labeled recognition failure)
//! 3. Summarization: the text becomes a concise or detailed summary
//! 4. Quiz composition: the summary's first sentence becomes a four-option question
//!
//! Only extraction failures abort a run. Recognition and summarization failures are
//! carried as typed outcomes whose display text describes the failure.
//!
//! # Architecture
//!
//! - `config` - Configuration management and prompt templates
//! - `audio_source` - Video reference parsing and validation
//! - `audio` - Download, transcode and scoped scratch storage
//! - `transcription` - Speech-to-text
//! - `summarization` - Summary generation (OpenAI, optional local T5)
//! - `quiz` - Fixed-template quiz composition and answer checking
//! - `report` - Text, Markdown and JSON reports
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vidquiz::audio_source::VideoReference;
//! use vidquiz::config::Settings;
//! use vidquiz::orchestrator::Orchestrator;
//! use vidquiz::summarization::SummaryStyle;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let reference = VideoReference::parse("lecture.mp4");
//!     let output = orchestrator.process(&reference, SummaryStyle::Concise).await?;
//!     println!("{}", output.summary);
//!     println!("{}", output.quiz.question());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod audio_source;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod quiz;
pub mod report;
pub mod summarization;
pub mod transcription;

pub use error::{Result, VidquizError};
