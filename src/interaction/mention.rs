//! Decides whether a message in a multi-party conversation is addressed to the bot.

use crate::base::types::ConversationKind;

/// Result of running the mention gate over a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Respond, using this text for the rest of the turn.
    Respond(String),
    /// Not addressed to the bot; the turn ends silently.
    Drop,
}

/// Apply the mention policy to already-normalized text.
///
/// Direct conversations always pass through unchanged. Group messages pass only
/// when they contain `bot_handle`; its first occurrence is removed and the
/// remainder trimmed. An empty handle never matches.
///
/// Telegram mentions arrive as `@handle`, so an `@` directly before that first
/// occurrence is removed with it. Only the leading `@` is extra; later
/// occurrences of the handle are always kept.
pub fn should_respond(kind: ConversationKind, normalized_text: &str, bot_handle: &str) -> GateDecision {
    match kind {
        ConversationKind::Direct => GateDecision::Respond(normalized_text.to_string()),
        ConversationKind::Group => {
            let Some(start) = normalized_text.find(bot_handle).filter(|_| !bot_handle.is_empty()) else {
                return GateDecision::Drop;
            };

            let end = start + bot_handle.len();
            let start = if normalized_text[..start].ends_with('@') { start - 1 } else { start };

            let mut stripped = String::with_capacity(normalized_text.len());
            stripped.push_str(&normalized_text[..start]);
            stripped.push_str(&normalized_text[end..]);

            GateDecision::Respond(stripped.trim().to_string())
        }
    }
}
