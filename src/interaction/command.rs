//! Static replies for `/start`, `/help` and `/faq`.

use crate::base::{config::Config, faq::FaqIndex, prompts, types::BotCommand};

/// Whether `text` is command-style input, which bypasses the message pipeline.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Answers bot commands from static configuration.
#[derive(Clone)]
pub struct CommandResponder {
    config: Config,
    faq: FaqIndex,
}

impl CommandResponder {
    pub fn new(config: Config, faq: FaqIndex) -> Self {
        Self { config, faq }
    }

    pub fn reply(&self, command: BotCommand) -> String {
        match command {
            BotCommand::Start => self.config.start_message.clone(),
            BotCommand::Help => self.config.help_message.clone(),
            BotCommand::Faq => self.faq_listing(),
        }
    }

    /// Render every FAQ entry, in configuration order, under the listing title.
    fn faq_listing(&self) -> String {
        if self.faq.is_empty() {
            return format!("{}\n\n{}", self.config.faq_title, prompts::EMPTY_FAQ_MESSAGE);
        }

        let entries = self
            .faq
            .entries()
            .iter()
            .map(|entry| format!("Q: {}\nA: {}", entry.display_question(), entry.answer))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{}\n\n{}", self.config.faq_title, entries)
    }
}
