//! OpenAI chat-completion summarizer.

use super::{LengthWindow, Summarizer, SummaryStyle};
use crate::config::{OpenAISettings, Prompts, SummarizationSettings};
use crate::error::{Result, SummarizationError};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Summarizer backed by an OpenAI chat model, run greedily with a fixed seed.
pub struct ChatSummarizer {
    client: Client<OpenAIConfig>,
    model: String,
    seed: i64,
    prompts: Prompts,
}

impl ChatSummarizer {
    pub fn with_config(
        settings: &SummarizationSettings,
        openai: &OpenAISettings,
        prompts: Prompts,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client(openai)?,
            model: settings.model.clone(),
            seed: settings.seed,
            prompts,
        })
    }

    /// Render the user prompt for one request.
    fn user_prompt(&self, text: &str, style: SummaryStyle, window: LengthWindow) -> String {
        let mut vars = HashMap::new();
        vars.insert("text".to_string(), text.to_string());
        vars.insert("style".to_string(), style.to_string());
        vars.insert("min_length".to_string(), window.min.to_string());
        vars.insert("max_length".to_string(), window.max.to_string());
        self.prompts
            .render_with_custom(&self.prompts.summary.user, &vars)
    }
}

/// Token ceiling for a word window: roughly 4/3 tokens per word plus slack.
fn token_budget(window: LengthWindow) -> u32 {
    window.max.saturating_mul(4) / 3 + 16
}

/// Backend configuration fingerprint. Outputs for the same seed are only comparable
/// when it matches.
fn fingerprint(system_fingerprint: Option<&str>) -> &str {
    system_fingerprint.unwrap_or("unknown")
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    #[instrument(skip(self, text), fields(model = %self.model, style = %style))]
    async fn summarize(
        &self,
        text: &str,
        style: SummaryStyle,
        window: LengthWindow,
    ) -> std::result::Result<String, SummarizationError> {
        let build_err = |e: async_openai::error::OpenAIError| {
            SummarizationError::Inference(format!("Failed to build request: {}", e))
        };

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.summary.system.clone())
                .build()
                .map_err(build_err)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(self.user_prompt(text, style, window))
                .build()
                .map_err(build_err)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .top_p(1.0)
            .seed(self.seed)
            .max_completion_tokens(token_budget(window))
            .build()
            .map_err(build_err)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SummarizationError::Inference(e.to_string()))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SummarizationError::Inference("Empty response from model".to_string()))?;

        debug!(
            "Model returned {} words (fingerprint {})",
            summary.split_whitespace().count(),
            fingerprint(response.system_fingerprint.as_deref())
        );
        Ok(summary)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summarizer() -> ChatSummarizer {
        ChatSummarizer::with_config(
            &SummarizationSettings::default(),
            &OpenAISettings::default(),
            Prompts::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_user_prompt_carries_window() {
        let prompt = summarizer().user_prompt(
            "Rust is a language.",
            SummaryStyle::Detailed,
            LengthWindow::new(50, 100),
        );
        assert!(prompt.contains("detailed"));
        assert!(prompt.contains("between 50 and 100 words"));
        assert!(prompt.ends_with("Rust is a language."));
    }

    #[test]
    fn test_user_prompt_keeps_transcript_verbatim() {
        let s = summarizer();
        let window = LengthWindow::new(20, 50);
        let first = s.user_prompt("He said {{max_length}} twice.", SummaryStyle::Concise, window);
        assert!(first.ends_with("He said {{max_length}} twice."));
        for _ in 0..50 {
            assert_eq!(
                s.user_prompt("He said {{max_length}} twice.", SummaryStyle::Concise, window),
                first
            );
        }
    }

    #[test]
    fn test_token_budget_exceeds_word_ceiling() {
        assert_eq!(token_budget(LengthWindow::new(20, 50)), 82);
        assert!(token_budget(LengthWindow::new(50, 100)) > 100);
    }

    #[test]
    fn test_fingerprint_fallback() {
        assert_eq!(fingerprint(Some("fp_44709d6fcb")), "fp_44709d6fcb");
        assert_eq!(fingerprint(None), "unknown");
    }

    #[test]
    fn test_name_is_model() {
        assert_eq!(summarizer().name(), "gpt-4o-mini");
    }
}
