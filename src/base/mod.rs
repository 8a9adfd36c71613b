//! Core components, types, and utilities for the faq-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The FAQ index.
//! - Default persona and canned texts.
//! - Common types and result handling.

pub mod config;
pub mod faq;
pub mod prompts;
pub mod types;
