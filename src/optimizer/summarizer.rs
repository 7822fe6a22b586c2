//! Model-assist: resumo via LLM usado como fallback da estratégia `smart`.
//!
//! O otimizador só conhece o trait [`Summarizer`]; a implementação padrão
//! chama o endpoint chat-completions compatível com OpenAI de forma bloqueante.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::utils::{char_len, take_chars, ActionTimer};

/// Máximo de caracteres de entrada enviados ao modelo
pub const MAX_SUMMARY_INPUT_CHARS: usize = 10_000;

/// Erros da chamada de model-assist
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("OPENAI_API_KEY not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("model returned an empty summary")]
    EmptyResponse,
}

/// Resume um texto mirando aproximadamente `target_tokens` tokens.
///
/// Implementações devem ser `Send + Sync`: o otimizador é compartilhado entre threads.
#[cfg_attr(test, mockall::automock)]
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, target_tokens: usize) -> Result<String, SummarizerError>;
}

/// Prompt de resumo focado em objetivos, metodologia, resultados e conclusões.
///
/// A entrada é cortada em [`MAX_SUMMARY_INPUT_CHARS`] caracteres.
pub fn build_summary_prompt(text: &str, target_tokens: usize) -> String {
    format!(
        "Please create a concise summary of this academic paper that preserves the most important information.\n\
         Focus on: research objectives, methodology, key findings, and conclusions.\n\
         Target length: approximately {} tokens.\n\n\
         Text to summarize:\n{}",
        target_tokens,
        take_chars(text, MAX_SUMMARY_INPUT_CHARS)
    )
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Cliente chat-completions (OpenAI ou compatível)
pub struct OpenAiSummarizer {
    client: reqwest::blocking::Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenAiSummarizer {
    /// Cria o cliente. Falha se não houver API key.
    pub fn new(config: LlmConfig) -> Result<Self, SummarizerError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SummarizerError::MissingApiKey)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SummarizerError::Http(e.to_string()))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base_url.trim_end_matches('/')
        )
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, text: &str, target_tokens: usize) -> Result<String, SummarizerError> {
        let timer = ActionTimer::start(format!("model-assist ({})", self.config.model));
        log::info!(
            "🤖 Model-assist: {} caracteres → ~{} tokens via {}",
            char_len(text).min(MAX_SUMMARY_INPUT_CHARS),
            target_tokens,
            self.config.model
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_summary_prompt(text, target_tokens),
            }],
            temperature: self.config.temperature,
            max_tokens: u32::try_from(target_tokens).unwrap_or(u32::MAX),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| SummarizerError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .map_err(|e| SummarizerError::Parse(e.to_string()))?;

        let summary = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(SummarizerError::EmptyResponse)?;

        timer.stop_and_log();
        Ok(summary)
    }
}
