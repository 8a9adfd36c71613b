pub mod telegram;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{MessageHandle, Res, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the messaging primitives the bot needs from a chat
/// platform like Telegram. Implementing this trait allows different chat
/// services to be used with the faq-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot handle.
    ///
    /// Returns the addressable name of the bot in the chat platform,
    /// which is used to detect when the bot is mentioned in groups.
    fn bot_handle(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This sets up event listeners for the chat platform and begins processing
    /// incoming messages and commands.
    async fn start(&self) -> Void;

    /// Send a message to a conversation, returning a handle that can later be edited.
    ///
    /// When `reply_to` is set, the message is threaded as a reply to that message.
    async fn send_message(&self, conversation_id: i64, reply_to: Option<i32>, text: &str) -> Res<MessageHandle>;

    /// Replace the text of a message previously sent by the bot.
    ///
    /// Fails when the message no longer exists or can no longer be edited.
    async fn edit_message(&self, handle: &MessageHandle, text: &str) -> Void;

    /// Show a "typing" indicator in a conversation.
    async fn send_typing(&self, conversation_id: i64) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
