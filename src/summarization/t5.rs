//! Local summarizer running a quantized Flan-T5 model through candle.
//!
//! Model artifacts are fetched from the HuggingFace hub on first use and kept
//! loaded for the life of the summarizer.

use super::{LengthWindow, Summarizer, SummaryStyle};
use crate::config::T5Settings;
use crate::error::SummarizationError;
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_transformers::models::quantized_t5::{Config as T5Config, T5ForConditionalGeneration};
use candle_transformers::quantized_var_builder::VarBuilder;
use hf_hub::api::sync::Api;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info, instrument};

type T5Result<T> = std::result::Result<T, SummarizationError>;

fn load_err(what: &str, e: impl std::fmt::Display) -> SummarizationError {
    SummarizationError::ModelLoad(format!("{what}: {e}"))
}

fn infer_err<E: std::fmt::Display>(what: &'static str) -> impl Fn(E) -> SummarizationError {
    move |e| SummarizationError::Inference(format!("{what}: {e}"))
}

/// Flan-T5 summarizer with lazy model loading.
pub struct T5Summarizer {
    settings: T5Settings,
    state: Arc<Mutex<Option<T5Model>>>,
}

impl T5Summarizer {
    pub fn new(settings: T5Settings) -> Self {
        Self {
            settings,
            state: Arc::new(Mutex::new(None)),
        }
    }
}

struct T5Model {
    model: T5ForConditionalGeneration,
    config: T5Config,
    tokenizer: Tokenizer,
    device: Device,
}

impl T5Model {
    fn load(settings: &T5Settings) -> T5Result<Self> {
        let device = Device::Cpu;
        let api = Api::new().map_err(|e| load_err("HF Hub API init", e))?;
        let repo = api.model(settings.repo.clone());

        let model_path = repo
            .get(&settings.model_file)
            .map_err(|e| load_err(&settings.model_file, e))?;
        let config_path = repo
            .get(&settings.config_file)
            .map_err(|e| load_err(&settings.config_file, e))?;
        let tokenizer_path = repo
            .get(&settings.tokenizer_file)
            .map_err(|e| load_err(&settings.tokenizer_file, e))?;

        let config_bytes =
            std::fs::read(&config_path).map_err(|e| load_err("Read config", e))?;
        let config: T5Config = serde_json::from_slice(&config_bytes)
            .map_err(|e| load_err("Parse T5 config", e))?;

        let vb = VarBuilder::from_gguf(&model_path, &device)
            .map_err(|e| load_err("Load GGUF model", e))?;
        let model = T5ForConditionalGeneration::load(vb, &config)
            .map_err(|e| load_err("Init T5 model", e))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| load_err("Load tokenizer", e))?;

        info!("Loaded T5 model from {}", settings.repo);
        Ok(Self {
            model,
            config,
            tokenizer,
            device,
        })
    }

    /// Greedy decode bounded by the length window.
    fn generate(&mut self, text: &str, window: LengthWindow, max_input: usize) -> T5Result<String> {
        let eos = self.config.eos_token_id as u32;
        let encoding = self
            .tokenizer
            .encode(format!("summarize: {}", text), true)
            .map_err(infer_err("Tokenize"))?;

        let mut input_ids: Vec<u32> = encoding.get_ids().to_vec();
        if max_input > 0 && input_ids.len() > max_input {
            debug!("Truncating input from {} to {} tokens", input_ids.len(), max_input);
            input_ids.truncate(max_input - 1);
            input_ids.push(eos);
        }

        self.model.clear_kv_cache();
        let input = Tensor::new(input_ids.as_slice(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(infer_err("Create input tensor"))?;
        let encoder_output = self.model.encode(&input).map_err(infer_err("Encoder forward"))?;

        let start = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut next_input = start;
        let mut output_ids: Vec<u32> = Vec::new();

        while output_ids.len() < window.max as usize {
            let decoder_input = Tensor::new(&[next_input], &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(infer_err("Create decoder input"))?;

            // One decoder position per step, so the flattened logits span the vocabulary.
            let logits: Vec<f32> = self
                .model
                .decode(&decoder_input, &encoder_output)
                .and_then(|t| t.to_dtype(DType::F32))
                .and_then(|t| t.flatten_all())
                .and_then(|t| t.to_vec1())
                .map_err(infer_err("Decoder forward"))?;

            let allow_eos = output_ids.len() >= window.min as usize;
            let next = pick_token(&logits, eos, allow_eos)
                .ok_or_else(|| SummarizationError::Inference("Empty logits".to_string()))?;

            if next == eos {
                break;
            }
            output_ids.push(next);
            next_input = next;
        }

        let summary = self
            .tokenizer
            .decode(&output_ids, true)
            .map_err(infer_err("Detokenize"))?;
        Ok(summary.trim().to_string())
    }
}

/// Greedy argmax, optionally masking the end-of-sequence token.
fn pick_token(logits: &[f32], eos: u32, allow_eos: bool) -> Option<u32> {
    logits
        .iter()
        .enumerate()
        .filter(|(idx, _)| allow_eos || *idx as u32 != eos)
        .fold(None, |best: Option<(usize, f32)>, (idx, &score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((idx, score)),
        })
        .map(|(idx, _)| idx as u32)
}

#[async_trait]
impl Summarizer for T5Summarizer {
    #[instrument(skip(self, text), fields(repo = %self.settings.repo, style = %style))]
    async fn summarize(
        &self,
        text: &str,
        style: SummaryStyle,
        window: LengthWindow,
    ) -> T5Result<String> {
        let state = Arc::clone(&self.state);
        let settings = self.settings.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let mut guard = state
                .lock()
                .map_err(|_| SummarizationError::Inference("Model lock poisoned".to_string()))?;
            if guard.is_none() {
                *guard = Some(T5Model::load(&settings)?);
            }
            match guard.as_mut() {
                Some(model) => model.generate(&text, window, settings.max_input_tokens),
                None => Err(SummarizationError::ModelLoad("Model unavailable".to_string())),
            }
        })
        .await
        .map_err(infer_err("Summarizer task"))?
    }

    fn name(&self) -> &str {
        &self.settings.model_file
    }
}
