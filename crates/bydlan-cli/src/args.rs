//! CLI argument definitions using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// Human-readable multi-line output
    Pretty,
}

#[derive(Debug, Parser)]
#[command(name = "bydlan")]
#[command(about = "Bydlan - group-chat bot that answers reply chains with Claude")]
#[command(
    long_about = r#"Bydlan - group-chat bot that answers reply chains with Claude

Configuration is read from the environment (and a .env file if present):
  TG_BOT_TOKEN            Telegram bot token (required)
  ANTHROPIC_API_KEY       Anthropic API key (required)
  BYDLAN_*                Optional overrides (BYDLAN_MODEL, BYDLAN_TRIGGER_WORD,
                          BYDLAN_DEBUG_CHAT_ID, BYDLAN_SYSTEM_PROMPT_FILE, ...)

Logging is controlled with RUST_LOG (default: info)."#
)]
#[command(version)]
pub struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Number of messages handled in parallel
    #[arg(short = 'w', long, env = "BYDLAN_WORKERS")]
    pub workers: Option<usize>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json, env = "BYDLAN_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Validate the configuration and exit without connecting
    #[arg(long)]
    pub check_config: bool,
}
