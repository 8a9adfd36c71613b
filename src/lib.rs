//! Library root for `faq-bot`.
//!
//! Faq-bot is a Telegram assistant for a small business designed to:
//! - Answer frequently asked questions instantly from configured trigger phrases
//! - Fall back to an LLM answer, shown in place of a "thinking" placeholder
//! - Stay quiet in groups unless it is mentioned
//!
//! One deployment serves one bot identity; a gym assistant and a tuition-center
//! assistant are two profiles of the same logic. The architecture is built around
//! extensible traits that allow for different implementations of each service.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the faq-bot runtime:
/// - Builds the FAQ index and the LLM and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting faq-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
