//! Message handling for faq-bot.
//!
//! This module turns inbound messages and commands into replies:
//! - Resolving a message through the mention gate, the FAQ index and the LLM fallback
//! - Answering bot commands from static configuration

pub mod command;
pub mod fallback;
pub mod mention;
pub mod turn;
