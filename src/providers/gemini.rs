use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::env;

use crate::config::ReplyServiceConfig;
use crate::llm_manager::LLMProvider;

/// Gemini API provider implementation
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: usize,
    temperature: f32,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    message: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
    code: Option<serde_json::Value>,
}

impl GeminiProvider {
    /// Create a provider from config, reading the API key from the environment.
    pub fn new(config: &ReplyServiceConfig) -> Result<Self> {
        let api_key = env::var(&config.api_key_env)
            .with_context(|| format!("{} environment variable not set", config.api_key_env))?;
        if api_key.trim().is_empty() {
            return Err(anyhow!("{} environment variable is empty", config.api_key_env));
        }
        Ok(Self::with_config(api_key, config))
    }

    pub fn with_config(api_key: String, config: &ReplyServiceConfig) -> Self {
        Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature.unwrap_or(0.7),
            client: reqwest::Client::new(),
        }
    }

    fn build_request<'a>(&'a self, prompt: &str) -> GeminiRequest<'a> {
        GeminiRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            max_tokens: Some(self.max_tokens),
            temperature: self.temperature,
            stream: false,
        }
    }

    /// Turn a raw HTTP response into reply text.
    fn parse_response(&self, status: StatusCode, body: &str) -> Result<String> {
        if !status.is_success() {
            return match serde_json::from_str::<GeminiError>(body) {
                Ok(error_response) => Err(anyhow!(
                    "Gemini API error: {} (type: {}, code: {})",
                    error_response.error.message,
                    error_response.error.error_type.as_deref().unwrap_or("unknown"),
                    error_response
                        .error
                        .code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| status.as_u16().to_string())
                )),
                Err(_) => Err(anyhow!("Gemini API error (status {}): {}", status, body)),
            };
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(body).context("Failed to parse Gemini response")?;

        let choice = gemini_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No response choices from Gemini"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!(
                "Gemini response was truncated due to max_tokens limit ({}). Response may be incomplete.",
                self.max_tokens
            );
        }

        if let Some(usage) = gemini_response.usage {
            info!(
                "Gemini token usage - Prompt: {}, Completion: {}, Total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let content = choice
            .message
            .content
            .ok_or_else(|| anyhow!("Gemini returned no text content"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read Gemini response body")?;

        self.parse_response(status, &response_text)
    }
}
