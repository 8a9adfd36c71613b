//! Generates an answer with the LLM, absorbing every failure into a degraded-mode answer.

use std::sync::Arc;

use tracing::{instrument, warn};

use crate::service::llm::LlmClient;

/// What the fallback responder produced for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The backend produced a usable, trimmed answer.
    Answer(String),
    /// The backend failed or produced nothing; `answer` is the degraded-mode reply.
    Degraded { reason: String, answer: String },
}

impl Generation {
    /// The text to send to the user.
    pub fn into_answer(self) -> String {
        match self {
            Generation::Answer(answer) => answer,
            Generation::Degraded { answer, .. } => answer,
        }
    }
}

/// Wraps the LLM client with the degraded-mode policy.
#[derive(Clone)]
pub struct FallbackResponder {
    llm: LlmClient,
    degraded_message: Arc<str>,
}

impl FallbackResponder {
    pub fn new(llm: LlmClient, degraded_message: &str) -> Self {
        Self {
            llm,
            degraded_message: degraded_message.into(),
        }
    }

    /// Ask the backend for an answer; never fails.
    #[instrument(skip_all)]
    pub async fn generate(&self, persona: &str, user_text: &str) -> Generation {
        match self.llm.complete(persona, user_text).await {
            Ok(answer) if !answer.trim().is_empty() => Generation::Answer(answer.trim().to_string()),
            Ok(_) => self.degraded("backend returned an empty answer".to_string()),
            Err(err) => {
                warn!("LLM call failed: {err:#}");
                self.degraded(err.to_string())
            }
        }
    }

    fn degraded(&self, reason: String) -> Generation {
        Generation::Degraded {
            reason,
            answer: self.degraded_message.to_string(),
        }
    }
}
