//! Telegram integration for faq-bot.
//!
//! This module provides the teloxide-backed `GenericChatClient`:
//! - Receiving messages and commands through a dispatcher
//! - Sending, editing, and "typing" primitives
//!
//! Each accepted message is handed to the turn resolver on its own task.

use crate::{
    base::{
        config::Config,
        faq::FaqIndex,
        types::{BotCommand, ConversationKind, Identity, InboundTurn, MessageHandle, Res, Void},
    },
    interaction::{
        self,
        command::{CommandResponder, is_command},
        turn::TurnResolver,
    },
    service::llm::LlmClient,
};
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{Chat, ChatAction, ChatId, Message, MessageId, ReplyParameters, Update},
    utils::command::BotCommands,
};
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the telegram implementation.

impl ChatClient {
    /// Creates a new Telegram chat client.
    pub async fn telegram(config: &Config, faq: FaqIndex, llm: LlmClient) -> Res<Self> {
        let client = TelegramChatClient::new(config, faq, llm).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<TelegramChatClient> for ChatClient {
    fn from(client: TelegramChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Commands.

/// Commands registered with Telegram.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
enum TelegramCommand {
    #[command(description = "introduce the bot.")]
    Start,
    #[command(description = "show help.")]
    Help,
    #[command(description = "list frequently asked questions.")]
    Faq,
}

impl From<TelegramCommand> for BotCommand {
    fn from(command: TelegramCommand) -> Self {
        match command {
            TelegramCommand::Start => BotCommand::Start,
            TelegramCommand::Help => BotCommand::Help,
            TelegramCommand::Faq => BotCommand::Faq,
        }
    }
}

// Structs.

/// Telegram client implementation.
#[derive(Clone)]
struct TelegramChatClient {
    bot: Bot,
    bot_handle: String,
    config: Config,
    faq: FaqIndex,
    llm: LlmClient,
}

impl TelegramChatClient {
    /// Create a new Telegram chat client.
    #[instrument(name = "TelegramChatClient::new", skip_all)]
    pub async fn new(config: &Config, faq: FaqIndex, llm: LlmClient) -> Res<Self> {
        let bot = Bot::new(config.telegram_token.clone());

        // Get the bot's username.

        let me = bot.get_me().await?;
        let discovered = me.user.username.clone();

        let bot_handle = match (&config.bot_handle, discovered) {
            (Some(configured), Some(discovered)) => {
                if !configured.trim_start_matches('@').eq_ignore_ascii_case(&discovered) {
                    warn!("Configured bot handle `{configured}` differs from Telegram username `{discovered}`; using the configured handle.");
                }
                configured.clone()
            }
            (Some(configured), None) => configured.clone(),
            (None, Some(discovered)) => discovered,
            (None, None) => return Err(anyhow::anyhow!("Bot has no Telegram username; set `bot_handle` in the profile.")),
        };

        info!("Telegram bot handle: {}", bot_handle);

        Ok(Self {
            bot,
            bot_handle,
            config: config.clone(),
            faq,
            llm,
        })
    }
}

#[async_trait]
impl GenericChatClient for TelegramChatClient {
    fn bot_handle(&self) -> &str {
        &self.bot_handle
    }

    async fn start(&self) -> Void {
        let identity = Identity::new(self.bot_handle(), &self.config.persona);
        let resolver = TurnResolver::new(self.config.clone(), identity, self.faq.clone(), self.llm.clone(), ChatClient::from(self.clone()));
        let commands = CommandResponder::new(self.config.clone(), self.faq.clone());

        // Register commands so clients can offer them.
        if let Err(err) = self.bot.set_my_commands(TelegramCommand::bot_commands()).await {
            warn!("Failed to register commands: {err}");
        }

        let handler = Update::filter_message()
            .branch(dptree::entry().filter_command::<TelegramCommand>().endpoint(handle_command))
            .branch(dptree::endpoint(handle_message));

        info!("Listening for Telegram updates ...");

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![resolver, commands])
            .default_handler(|update| async move {
                debug!("Unhandled update: {:?}", update.id);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, conversation_id: i64, reply_to: Option<i32>, text: &str) -> Res<MessageHandle> {
        let mut request = self.bot.send_message(ChatId(conversation_id), text);

        if let Some(message_id) = reply_to {
            request = request.reply_parameters(reply_parameters(message_id));
        }

        let sent = request.await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(MessageHandle {
            conversation_id,
            message_id: sent.id.0,
        })
    }

    #[instrument(skip(self, text))]
    async fn edit_message(&self, handle: &MessageHandle, text: &str) -> Void {
        self.bot
            .edit_message_text(ChatId(handle.conversation_id), MessageId(handle.message_id), text)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to edit message: {}", e))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_typing(&self, conversation_id: i64) -> Void {
        self.bot
            .send_chat_action(ChatId(conversation_id), ChatAction::Typing)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send chat action: {}", e))?;

        Ok(())
    }
}

// Dispatcher endpoints.

/// Answers a recognized command.
#[instrument(skip_all)]
async fn handle_command(bot: Bot, msg: Message, command: TelegramCommand, commands: CommandResponder) -> ResponseResult<()> {
    info!("Received command {:?} in chat {}", command, msg.chat.id.0);

    bot.send_message(msg.chat.id, commands.reply(command.into())).reply_parameters(reply_parameters(msg.id.0)).await?;

    Ok(())
}

/// Hands a plain message to the turn resolver.
#[instrument(skip_all)]
async fn handle_message(msg: Message, resolver: TurnResolver) -> ResponseResult<()> {
    let Some(text) = msg.text().or(msg.caption()) else {
        debug!("Skipping message without text.");
        return Ok(());
    };

    // Unrecognized commands never reach the pipeline.
    if is_command(text) {
        debug!("Skipping unrecognized command.");
        return Ok(());
    }

    let kind = conversation_kind(&msg.chat);

    info!("Received message in chat {} ({:?})", msg.chat.id.0, kind);

    let turn = InboundTurn::new(msg.chat.id.0, kind, Some(text.to_string())).replying_to(msg.id.0);
    interaction::turn::handle_turn(turn, resolver);

    Ok(())
}

/// Thread a reply to `message_id`; still send if that message is gone.
fn reply_parameters(message_id: i32) -> ReplyParameters {
    ReplyParameters::new(MessageId(message_id)).allow_sending_without_reply()
}

/// Private chats are direct; groups, supergroups and channels are multi-party.
fn conversation_kind(chat: &Chat) -> ConversationKind {
    if chat.is_private() { ConversationKind::Direct } else { ConversationKind::Group }
}

// Tests.
