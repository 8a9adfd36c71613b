//! Integration with the OpenAI responses API.
//!
//! This module provides the default `GenericLlmClient` implementation: one
//! request carrying the persona as a system message and the user's text as a
//! user message, bounded by a per-attempt timeout and retried with
//! exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use crate::base::{config::Config, types::Res};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, Role, TextConfig, TextResponseFormat},
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let mut cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        if let Some(api_base) = &config.openai_api_base {
            cfg = cfg.with_api_base(api_base.clone());
        }

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the persona + user message input.
    fn build_input(&self, persona: &str, user_text: &str) -> Res<Input> {
        Ok(Input::Items(vec![
            InputItem::Message(InputMessageArgs::default().role(Role::System).content(persona.to_string()).build()?),
            InputItem::Message(InputMessageArgs::default().role(Role::User).content(user_text.to_string()).build()?),
        ]))
    }

    /// Helper function to make OpenAI API calls with retry logic and timeout handling.
    async fn call_openai_api(&self, request_builder: CreateResponseArgs) -> Res<Response> {
        let max_retries = self.config.openai_max_retries;
        let per_attempt = Duration::from_secs(self.config.openai_timeout_secs);

        let mut retries = 0;

        loop {
            let request = request_builder.build()?;
            let result = timeout(per_attempt, self.client.responses().create(request)).await;

            match result {
                Ok(Ok(response)) => {
                    info!("OpenAI API call succeeded after {} attempts", retries + 1);
                    return Ok(response);
                }
                Ok(Err(err)) => {
                    if retries >= max_retries {
                        return Err(anyhow::anyhow!("OpenAI API call failed after {max_retries} retries: {err}"));
                    }
                    retries += 1;
                    warn!("OpenAI API call failed, retrying {retries}/{max_retries}: {err}");
                }
                Err(_) => {
                    if retries >= max_retries {
                        return Err(anyhow::anyhow!("OpenAI API call timed out after {} attempts", max_retries + 1));
                    }
                    retries += 1;
                    warn!("OpenAI API call timed out, retrying {retries}/{max_retries}");
                }
            }

            tokio::time::sleep(retry_delay(retries)).await;
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::complete", skip_all)]
    async fn complete(&self, persona: &str, user_text: &str) -> Res<String> {
        let input = self.build_input(persona, user_text)?;

        let text_config = TextConfig { format: TextResponseFormat::Text };

        let mut request = CreateResponseArgs::default();
        request
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_model)
            .text(text_config)
            .input(input);

        // Reasoning models reject a temperature.
        if !self.config.openai_model.starts_with('o') {
            request.temperature(self.config.openai_temperature);
        }

        let response = self.call_openai_api(request).await?;

        parse_openai_response(&response)
    }
}

/// Collect the text output of a response.
///
/// A refusal, or a response with no text at all, is an error.
#[instrument(skip_all)]
pub fn parse_openai_response(response: &Response) -> Res<String> {
    let mut parts = Vec::new();

    debug!("LLM response has {} outputs.", response.output.len());
    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(text) => parts.push(text.text.clone()),
                        Content::Refusal(reason) => {
                            return Err(anyhow::anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                warn!("Unexpected output: {output:#?}");
            }
        }
    }

    let text = parts.join("\n").trim().to_string();

    if text.is_empty() {
        return Err(anyhow::anyhow!("LLM response contained no text."));
    }

    Ok(text)
}

/// Backoff before retry `attempt` (1-based): doubles from 500ms, capped at 8s.
fn retry_delay(attempt: u32) -> Duration {
    const RETRY_DELAY_MS: u64 = 500;
    const MAX_RETRY_DELAY_MS: u64 = 8_000;

    let factor = 2_u64.checked_pow(attempt.saturating_sub(1)).unwrap_or(u64::MAX);

    Duration::from_millis(RETRY_DELAY_MS.saturating_mul(factor).min(MAX_RETRY_DELAY_MS))
}

// Tests.
