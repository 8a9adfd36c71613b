//! Runtime services and shared state for the faq-bot.

use crate::prelude::*;
use crate::service::{chat::ChatClient, llm::LlmClient};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the FAQ index, and the LLM and chat clients.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The FAQ index, built once from the configuration.
    pub faq: FaqIndex,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Build the FAQ index.
        let faq = FaqIndex::new(config.faq.clone())?;
        info!("Loaded {} FAQ entries", faq.len());

        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the telegram client.
        let chat = ChatClient::telegram(&config, faq.clone(), llm.clone()).await?;

        Ok(Self { config, faq, llm, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
