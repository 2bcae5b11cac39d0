use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use std::time::Duration;

use crate::error::ReplyError;

/// Returned to the user whenever the model cannot be reached.
pub const FALLBACK_REPLY: &str =
    "Yaar abhi mera AI brain connect nahi ho paa raha, thodi der baad try karo.";

/// Trait representing an LLM provider.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Name of the provider.
    fn name(&self) -> &str;

    /// Send a prompt to the provider and return the response.
    async fn send_prompt(&self, prompt: &str) -> Result<String>;

    /// Model name of the provider.
    fn model_name(&self) -> &str {
        "Unknown"
    }
}

/// Generates short replies for messages that aren't commands.
///
/// `generate` never fails: any provider error, a timeout, or a missing
/// provider all turn into [`FALLBACK_REPLY`].
pub struct ReplyService {
    provider: Option<Box<dyn LLMProvider>>,
    timeout: Duration,
}

impl ReplyService {
    pub fn new(provider: Box<dyn LLMProvider>, timeout: Duration) -> Self {
        info!(
            "Reply service using {} ({})",
            provider.name(),
            provider.model_name()
        );
        Self {
            provider: Some(provider),
            timeout,
        }
    }

    /// A service with no backing model. Every call falls back.
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Ask the provider, surfacing the reason when it fails.
    pub async fn try_generate(&self, prompt: &str) -> Result<String, ReplyError> {
        let provider = self.provider.as_ref().ok_or(ReplyError::Unconfigured)?;

        match tokio::time::timeout(self.timeout, provider.send_prompt(prompt)).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(source)) => Err(ReplyError::Provider {
                provider: provider.name().to_string(),
                source,
            }),
            Err(_) => Err(ReplyError::Timeout {
                provider: provider.name().to_string(),
                timeout: self.timeout,
            }),
        }
    }

    /// Ask the provider, substituting the fallback reply on any failure.
    pub async fn generate(&self, prompt: &str) -> String {
        match self.try_generate(prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!("Reply service error: {}", err);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
