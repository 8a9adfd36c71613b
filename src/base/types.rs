use std::{fmt, sync::Arc};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The kind of conversation a message arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    /// A one-to-one conversation with the bot.
    Direct,
    /// A multi-party conversation (group, supergroup, or channel).
    Group,
}

/// One inbound message, constructed per update and dropped once the turn is resolved.
#[derive(Debug, Clone)]
pub struct InboundTurn {
    pub conversation_id: i64,
    pub conversation_kind: ConversationKind,
    pub raw_text: Option<String>,
    /// Id of the inbound message, which replies are threaded to.
    pub message_id: Option<i32>,
}

impl InboundTurn {
    pub fn new(conversation_id: i64, conversation_kind: ConversationKind, raw_text: Option<String>) -> Self {
        Self {
            conversation_id,
            conversation_kind,
            raw_text,
            message_id: None,
        }
    }

    /// Thread every reply of this turn to the inbound message `message_id`.
    pub fn replying_to(mut self, message_id: i32) -> Self {
        self.message_id = Some(message_id);
        self
    }

    /// Lower-cased text of the message; absent text normalizes to the empty string.
    pub fn normalized_text(&self) -> String {
        self.raw_text.as_deref().unwrap_or_default().to_lowercase()
    }
}

/// A reference to a message the bot has sent, usable as an edit target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub conversation_id: i64,
    pub message_id: i32,
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.conversation_id, self.message_id)
    }
}

/// The addressable name of the bot and the persona it presents to the LLM.
///
/// The handle is stored lower-cased so it can be matched against normalized text.
#[derive(Debug, Clone)]
pub struct Identity {
    inner: Arc<IdentityInner>,
}

#[derive(Debug)]
struct IdentityInner {
    handle: String,
    persona: String,
}

impl Identity {
    pub fn new(handle: &str, persona: &str) -> Self {
        let handle = handle.trim().trim_start_matches('@').to_lowercase();

        Self {
            inner: Arc::new(IdentityInner {
                handle,
                persona: persona.to_string(),
            }),
        }
    }

    pub fn handle(&self) -> &str {
        &self.inner.handle
    }

    pub fn persona(&self) -> &str {
        &self.inner.persona
    }
}

/// Commands the bot answers outside of the message pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    Faq,
}
