pub mod openai;

use crate::base::types::Res;
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the single completion the bot needs from a large language
/// model. Implementing this trait allows different LLM providers to be used with
/// the faq-bot, and lets tests substitute a stub backend.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Generate an answer to `user_text` under the `persona` system instruction.
    ///
    /// Transport errors, timeouts, refusals and malformed responses are returned
    /// as errors; callers decide how to degrade.
    async fn complete(&self, persona: &str, user_text: &str) -> Res<String>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
