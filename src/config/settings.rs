//! Configuration settings for Vidquiz.

use crate::error::{Result, VidquizError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub extraction: ExtractionSettings,
    pub transcription: TranscriptionSettings,
    pub summarization: SummarizationSettings,
    pub openai: OpenAISettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for per-run scratch directories.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/vidquiz".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Audio extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Output sample rate of the normalized waveform.
    pub sample_rate: u32,
    /// Output channel count of the normalized waveform.
    pub channels: u16,
    /// yt-dlp format selector for remote references.
    pub ytdlp_format: String,
    /// Accepted extensions for local video files (mp4 container family).
    pub local_extensions: Vec<String>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            ytdlp_format: "bestaudio/best".to_string(),
            local_extensions: ["mp4", "m4v", "m4a", "mov", "3gp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Optional ISO-639-1 language hint.
    pub language: Option<String>,
    /// Split audio longer than this many seconds into separate requests. 0 disables splitting.
    pub chunk_duration_seconds: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            language: None,
            chunk_duration_seconds: 600,
        }
    }
}

/// Summarization backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    /// OpenAI chat completion with temperature 0 and a fixed seed.
    ///
    /// Seeded sampling is best effort on the service side and can change when the
    /// backend fingerprint changes. Use `T5` when runs must be bit-for-bit repeatable.
    #[default]
    OpenAI,
    /// Local quantized T5 (requires the `local-summarizer` feature).
    T5,
}

impl std::str::FromStr for SummarizerProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(SummarizerProvider::OpenAI),
            "t5" | "local" => Ok(SummarizerProvider::T5),
            _ => Err(format!("Unknown summarizer provider: {}", s)),
        }
    }
}

impl std::fmt::Display for SummarizerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummarizerProvider::OpenAI => write!(f, "openai"),
            SummarizerProvider::T5 => write!(f, "t5"),
        }
    }
}

/// Target length window for one summary style.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowSettings {
    pub min_length: u32,
    pub max_length: u32,
}

/// Local T5 model artifacts on the HuggingFace hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct T5Settings {
    pub repo: String,
    pub model_file: String,
    pub config_file: String,
    pub tokenizer_file: String,
    /// Input is truncated to this many tokens before encoding.
    pub max_input_tokens: usize,
}

impl Default for T5Settings {
    fn default() -> Self {
        Self {
            repo: "lmz/candle-quantized-t5".to_string(),
            model_file: "model-flan-t5-base.gguf".to_string(),
            config_file: "config-flan-t5-base.json".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            max_input_tokens: 512,
        }
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationSettings {
    pub provider: SummarizerProvider,
    /// Chat model for the OpenAI provider.
    pub model: String,
    /// Sampling seed for the OpenAI provider.
    pub seed: i64,
    pub concise: WindowSettings,
    pub detailed: WindowSettings,
    pub t5: T5Settings,
}

impl Default for SummarizationSettings {
    fn default() -> Self {
        Self {
            provider: SummarizerProvider::OpenAI,
            model: "gpt-4o-mini".to_string(),
            seed: 42,
            concise: WindowSettings {
                min_length: 20,
                max_length: 50,
            },
            detailed: WindowSettings {
                min_length: 50,
                max_length: 100,
            },
            t5: T5Settings::default(),
        }
    }
}

/// OpenAI client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAISettings {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Alternative API base URL (for compatible servers).
    pub api_base: Option<String>,
}

impl Default for OpenAISettings {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            api_base: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed to call the API. Empty means same-origin only;
    /// `"*"` allows any origin.
    pub allowed_origins: Vec<String>,
    /// When set, `/process` only accepts local paths inside this directory.
    /// Relative inputs resolve against it.
    pub media_root: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: Vec::new(),
            media_root: None,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject settings that cannot produce a working pipeline.
    pub fn validate(&self) -> Result<()> {
        for (name, window) in [
            ("concise", &self.summarization.concise),
            ("detailed", &self.summarization.detailed),
        ] {
            if window.min_length > window.max_length {
                return Err(VidquizError::Config(format!(
                    "summarization.{}: min_length ({}) exceeds max_length ({})",
                    name, window.min_length, window.max_length
                )));
            }
        }
        if self.extraction.channels == 0 || self.extraction.sample_rate == 0 {
            return Err(VidquizError::Config(
                "extraction.sample_rate and extraction.channels must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VidquizError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Return a copy with `key` (dotted path, e.g. "summarization.model") set to `value`.
    ///
    /// The value is parsed as a boolean, integer, or float before falling back to a string.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self> {
        let mut root = toml::Value::try_from(self).map_err(|e| VidquizError::Config(e.to_string()))?;

        let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| VidquizError::Config("Empty configuration key".to_string()))?;

        let mut table = root
            .as_table_mut()
            .ok_or_else(|| VidquizError::Config("Configuration root is not a table".to_string()))?;
        for part in parents {
            table = table
                .get_mut(*part)
                .and_then(|v| v.as_table_mut())
                .ok_or_else(|| VidquizError::Config(format!("Unknown configuration key: {}", key)))?;
        }

        table.insert(last.to_string(), parse_value(value));

        let updated: Settings = root
            .try_into()
            .map_err(|e: toml::de::Error| VidquizError::Config(e.to_string()))?;
        updated.validate()?;
        Ok(updated)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidquiz")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

fn parse_value(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(raw.to_string())
    }
}
