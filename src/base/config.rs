//! Load configuration via `config` crate with env-override support.
//!
//! Credentials are resolved separately from the rest of the profile: each one
//! has a canonical environment variable followed by legacy alternates, and the
//! first non-empty value wins.

use std::{ops::Deref, path::Path, sync::Arc};

use config::{
    FileFormat,
    builder::{ConfigBuilder, DefaultState},
};
use serde::Deserialize;

use crate::base::{faq::FaqEntry, prompts};

use super::types::Res;

/// Environment variables holding the Telegram bot token, in order of precedence.
pub const TELEGRAM_TOKEN_VARS: &[&str] = &["TELEGRAM_TOKEN", "TELEGRAM_TOKEN_BOT2", "TELEGRAM_TOKEN_BOT1"];

/// Environment variables holding the OpenAI API key, in order of precedence.
pub const OPENAI_API_KEY_VARS: &[&str] = &["OPENAI_API_KEY", "OPENAI_API_KEY_BOT2", "OPENAI_API_KEY_BOT1"];

/// Prefix for environment overrides of profile fields (e.g. `FAQ_BOT_OPENAI_MODEL`).
pub const ENV_PREFIX: &str = "FAQ_BOT";

/// Default profile location when no explicit path is given.
pub const DEFAULT_CONFIG_PATH: &str = ".hidden/config.toml";

/// Upper bound on `openai_max_retries`.
pub const MAX_OPENAI_RETRIES: u32 = 5;

/// Default OpenAI model to use
fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default sampling temperature for OpenAI model
fn default_openai_temperature() -> f32 {
    0.7
}

/// Default max output tokens for OpenAI model
fn default_openai_max_tokens() -> u32 {
    1024
}

fn default_openai_timeout_secs() -> u64 {
    30
}

fn default_openai_max_retries() -> u32 {
    1
}

fn default_persona() -> String {
    prompts::DEFAULT_PERSONA.to_string()
}

fn default_placeholder_message() -> String {
    prompts::DEFAULT_PLACEHOLDER_MESSAGE.to_string()
}

fn default_degraded_message() -> String {
    prompts::DEFAULT_DEGRADED_MESSAGE.to_string()
}

fn default_start_message() -> String {
    prompts::DEFAULT_START_MESSAGE.to_string()
}

fn default_help_message() -> String {
    prompts::DEFAULT_HELP_MESSAGE.to_string()
}

fn default_faq_title() -> String {
    prompts::DEFAULT_FAQ_TITLE.to_string()
}

fn default_show_typing() -> bool {
    true
}

/// Configuration for the faq-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Telegram bot token (`TELEGRAM_TOKEN`, `TELEGRAM_TOKEN_BOT2`, `TELEGRAM_TOKEN_BOT1`).
    #[serde(default)]
    pub telegram_token: String,
    /// OpenAI API key (`OPENAI_API_KEY`, `OPENAI_API_KEY_BOT2`, `OPENAI_API_KEY_BOT1`).
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI model to use (`FAQ_BOT_OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Sampling temperature (`FAQ_BOT_OPENAI_TEMPERATURE`), between 0 and 2.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Max output tokens for the OpenAI model (`FAQ_BOT_OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Per-attempt timeout for OpenAI calls, in seconds (`FAQ_BOT_OPENAI_TIMEOUT_SECS`).
    #[serde(default = "default_openai_timeout_secs")]
    pub openai_timeout_secs: u64,
    /// Retries after a failed or timed out OpenAI call (`FAQ_BOT_OPENAI_MAX_RETRIES`).
    #[serde(default = "default_openai_max_retries")]
    pub openai_max_retries: u32,
    /// Alternate OpenAI-compatible API base URL (`FAQ_BOT_OPENAI_API_BASE`).
    #[serde(default)]
    pub openai_api_base: Option<String>,
    /// Handle used to detect mentions in groups (`FAQ_BOT_BOT_HANDLE`).
    /// Discovered from Telegram when absent.
    #[serde(default)]
    pub bot_handle: Option<String>,
    /// System instruction for the LLM (`FAQ_BOT_PERSONA`).
    #[serde(default = "default_persona")]
    pub persona: String,
    /// Interim message shown while the LLM is working (`FAQ_BOT_PLACEHOLDER_MESSAGE`).
    #[serde(default = "default_placeholder_message")]
    pub placeholder_message: String,
    /// Answer sent when the LLM fails (`FAQ_BOT_DEGRADED_MESSAGE`).
    #[serde(default = "default_degraded_message")]
    pub degraded_message: String,
    /// Whether to show a typing indicator while the LLM is working (`FAQ_BOT_SHOW_TYPING`).
    #[serde(default = "default_show_typing")]
    pub show_typing: bool,
    /// Reply to `/start` (`FAQ_BOT_START_MESSAGE`).
    #[serde(default = "default_start_message")]
    pub start_message: String,
    /// Reply to `/help` (`FAQ_BOT_HELP_MESSAGE`).
    #[serde(default = "default_help_message")]
    pub help_message: String,
    /// Heading of the `/faq` listing (`FAQ_BOT_FAQ_TITLE`).
    #[serde(default = "default_faq_title")]
    pub faq_title: String,
    /// FAQ entries, matched in this order.
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
}

impl Config {
    /// Load from the profile file (explicit, or `.hidden/config.toml` if present), then
    /// `FAQ_BOT_*` environment overrides, then the resolved credentials.
    pub fn load(explicit_path: Option<&Path>) -> Res<Self> {
        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            cfg = cfg.add_source(config::File::with_name(DEFAULT_CONFIG_PATH));
        }

        cfg = cfg.add_source(config::Environment::with_prefix(ENV_PREFIX));

        Self::build(cfg, |name| std::env::var(name).ok())
    }

    /// Load from an in-memory TOML profile, resolving credentials through `lookup`.
    pub fn from_toml(profile: &str, lookup: impl Fn(&str) -> Option<String>) -> Res<Self> {
        let cfg = config::Config::builder().add_source(config::File::from_str(profile, FileFormat::Toml));

        Self::build(cfg, lookup)
    }

    fn build(cfg: ConfigBuilder<DefaultState>, lookup: impl Fn(&str) -> Option<String>) -> Res<Self> {
        let telegram_token = resolve_credential(TELEGRAM_TOKEN_VARS, &lookup);
        let openai_api_key = resolve_credential(OPENAI_API_KEY_VARS, &lookup);

        let inner: ConfigInner = cfg
            .set_override_option("telegram_token", telegram_token)?
            .set_override_option("openai_api_key", openai_api_key)?
            .build()?
            .try_deserialize()?;

        let result = Config { inner: Arc::new(inner) };

        result.validate()?;

        Ok(result)
    }

    fn validate(&self) -> Res<()> {
        if self.telegram_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Telegram token not set. Add TELEGRAM_TOKEN (or TELEGRAM_TOKEN_BOT2) to env."));
        }

        if self.openai_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("OpenAI key not set. Add OPENAI_API_KEY (or OPENAI_API_KEY_BOT2) to env."));
        }

        if self.openai_temperature < 0.0 || self.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if self.openai_max_tokens < 1 || self.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        if self.openai_timeout_secs == 0 {
            return Err(anyhow::anyhow!("OpenAI timeout must be at least one second."));
        }

        if self.openai_max_retries > MAX_OPENAI_RETRIES {
            return Err(anyhow::anyhow!("OpenAI max retries must be between 0 and {MAX_OPENAI_RETRIES}."));
        }

        if let Some(handle) = &self.bot_handle
            && handle.trim().trim_start_matches('@').is_empty()
        {
            return Err(anyhow::anyhow!("Bot handle must not be empty when set."));
        }

        Ok(())
    }
}

/// Return the first non-empty value among `names`, in order.
pub fn resolve_credential(names: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    names.iter().filter_map(|name| lookup(name)).find(|value| !value.trim().is_empty())
}
