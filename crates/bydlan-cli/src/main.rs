//! Bydlan bot launcher
//!
//! Loads configuration from the environment, connects to Telegram and
//! answers group messages until interrupted.

mod args;
mod bot;
mod logging;
mod signal_handler;

use anyhow::Context;
use args::Cli;
use bydlan_core::config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Before anything reads the environment
    config::load_dotenv(cli.env_file.as_deref())?;
    logging::init(cli.log_format);

    let mut config = config::load_from_env().context("failed to load configuration")?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.validate().context("invalid configuration")?;

    if cli.check_config {
        tracing::info!(
            model = %config.anthropic.model,
            workers = config.workers,
            trigger_word = %config.conversation.trigger_word,
            cache_capacity = config.conversation.cache_capacity,
            debug_chat = ?config.debug_chat_id,
            "configuration is valid"
        );
        return Ok(());
    }

    bot::run(config).await
}
