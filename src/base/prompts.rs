//! Default persona and canned texts used when a profile does not override them.

/// System instruction given to the LLM for every fallback answer.
pub const DEFAULT_PERSONA: &str = "You are a helpful assistant for a small business. Prefer FAQ answers when possible, and keep replies short and friendly.";

/// Interim message shown while the LLM answer is being generated.
pub const DEFAULT_PLACEHOLDER_MESSAGE: &str = "Thinking...";

/// Answer used whenever the LLM cannot produce a usable reply.
pub const DEFAULT_DEGRADED_MESSAGE: &str = "Sorry, I can't answer right now. Please contact us directly.";

/// Reply to `/start`.
pub const DEFAULT_START_MESSAGE: &str = "Hello! I am the official bot for this business. Type /faq for common questions.";

/// Reply to `/help`.
pub const DEFAULT_HELP_MESSAGE: &str = "Type /faq to see frequently asked questions.";

/// Heading of the `/faq` listing.
pub const DEFAULT_FAQ_TITLE: &str = "Frequently Asked Questions";

/// Body of the `/faq` listing when no entries are configured.
pub const EMPTY_FAQ_MESSAGE: &str = "No questions have been configured yet.";
