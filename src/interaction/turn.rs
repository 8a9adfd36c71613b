//! Resolves one inbound message into at most one reply.
//!
//! The flow is: normalize, gate on mentions, answer from the FAQ if possible,
//! otherwise place a "working" message, ask the LLM, and finalize by editing the
//! placeholder (or sending fresh if the edit fails).

use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        faq::FaqIndex,
        types::{Identity, InboundTurn, MessageHandle, Res},
    },
    interaction::{
        fallback::{FallbackResponder, Generation},
        mention::{GateDecision, should_respond},
    },
    service::{chat::ChatClient, llm::LlmClient},
};

/// How a turn terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Not addressed to the bot; nothing was sent.
    Dropped,
    /// Answered from the FAQ with a single message.
    Matched,
    /// The placeholder was edited in place with the final answer.
    Edited,
    /// The placeholder could not be edited, so the answer was sent as a new message.
    Resent,
    /// No placeholder could be placed, so the answer was sent as a new message.
    Sent,
}

/// Per-message state machine over the FAQ index, the mention gate and the fallback responder.
///
/// It is trivially cloneable and shared read-only across concurrent turns.
#[derive(Clone)]
pub struct TurnResolver {
    config: Config,
    identity: Identity,
    faq: FaqIndex,
    fallback: FallbackResponder,
    chat: ChatClient,
}

impl TurnResolver {
    pub fn new(config: Config, identity: Identity, faq: FaqIndex, llm: LlmClient, chat: ChatClient) -> Self {
        let fallback = FallbackResponder::new(llm, &config.degraded_message);

        Self {
            config,
            identity,
            faq,
            fallback,
            chat,
        }
    }

    /// Run one turn to completion.
    ///
    /// Returns an error only when the final answer could not be delivered at all.
    #[instrument(skip_all, fields(conversation_id = turn.conversation_id))]
    pub async fn resolve(&self, turn: InboundTurn) -> Res<TurnOutcome> {
        let conversation_id = turn.conversation_id;
        let reply_to = turn.message_id;
        let normalized = turn.normalized_text();

        // Gate.

        let text = match should_respond(turn.conversation_kind, &normalized, self.identity.handle()) {
            GateDecision::Respond(text) => text,
            GateDecision::Drop => {
                debug!("Message not addressed to the bot, dropping.");
                return Ok(TurnOutcome::Dropped);
            }
        };

        // FAQ fast path.

        if let Some(answer) = self.faq.lookup(&text) {
            info!("Answering from FAQ ...");
            self.chat.send_message(conversation_id, reply_to, answer).await?;
            return Ok(TurnOutcome::Matched);
        }

        // Placeholder, then the LLM.

        let placeholder = self.place(conversation_id, reply_to).await;

        if self.config.show_typing
            && let Err(err) = self.chat.send_typing(conversation_id).await
        {
            warn!("Failed to send typing indicator: {err}");
        }

        let generation = self.fallback.generate(self.identity.persona(), &text).await;

        if let Generation::Degraded { reason, .. } = &generation {
            warn!("Sending degraded answer: {reason}");
        }

        self.finalize(conversation_id, reply_to, placeholder, &generation.into_answer()).await
    }

    /// Send the placeholder message; a failure here only means finalizing with a fresh send.
    async fn place(&self, conversation_id: i64, reply_to: Option<i32>) -> Option<MessageHandle> {
        match self.chat.send_message(conversation_id, reply_to, &self.config.placeholder_message).await {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("Failed to send placeholder: {err}");
                None
            }
        }
    }

    /// Deliver the answer exactly once: edit the placeholder, or send a new message.
    async fn finalize(&self, conversation_id: i64, reply_to: Option<i32>, placeholder: Option<MessageHandle>, answer: &str) -> Res<TurnOutcome> {
        let Some(handle) = placeholder else {
            self.chat.send_message(conversation_id, reply_to, answer).await?;
            return Ok(TurnOutcome::Sent);
        };

        match self.chat.edit_message(&handle, answer).await {
            Ok(()) => Ok(TurnOutcome::Edited),
            Err(err) => {
                warn!("Failed to edit placeholder {handle}, sending a new message: {err}");
                self.chat.send_message(conversation_id, reply_to, answer).await?;
                Ok(TurnOutcome::Resent)
            }
        }
    }
}

/// Resolve a turn on its own task.
#[instrument(skip_all)]
pub fn handle_turn(turn: InboundTurn, resolver: TurnResolver) {
    tokio::spawn(async move {
        // Process the turn.
        let result = resolver.resolve(turn).in_current_span().await;

        // Log the outcome.
        match result {
            Ok(outcome) => info!("Turn finished: {outcome:?}"),
            Err(err) => error!("Error while handling: {}", err),
        }
    });
}
