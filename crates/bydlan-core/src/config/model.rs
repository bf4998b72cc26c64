//! Configuration data model

use super::defaults;
use crate::chat::ChatId;
use crate::conversation::DEFAULT_CACHE_CAPACITY;
use crate::error::{BotError, BotResult};
use crate::llm::AnthropicModel;
use crate::llm::models::max_tokens_for;
use crate::splitter::TELEGRAM_MAX_MESSAGE_LENGTH;
use crate::trigger::DEFAULT_TRIGGER_WORD;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Formatting applied to outgoing Telegram messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    Markdown,
    MarkdownV2,
    Html,
    /// Send text as-is
    Plain,
}

impl ParseMode {
    /// Value of the Bot API `parse_mode` field
    pub fn as_api_value(&self) -> Option<&'static str> {
        match self {
            Self::Markdown => Some("Markdown"),
            Self::MarkdownV2 => Some("MarkdownV2"),
            Self::Html => Some("HTML"),
            Self::Plain => None,
        }
    }
}

impl std::str::FromStr for ParseMode {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" => Ok(Self::Markdown),
            "markdownv2" => Ok(Self::MarkdownV2),
            "html" => Ok(Self::Html),
            "plain" | "none" | "" => Ok(Self::Plain),
            other => Err(BotError::config(format!("Unknown parse mode '{}'", other))),
        }
    }
}

/// Telegram Bot API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(skip_serializing)]
    pub bot_token: String,
    pub api_url: String,
    pub poll_timeout_secs: u64,
    pub message_log_capacity: usize,
    pub parse_mode: ParseMode,
    pub max_flood_wait_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: defaults::TELEGRAM_API_URL.to_string(),
            poll_timeout_secs: defaults::POLL_TIMEOUT_SECS,
            message_log_capacity: defaults::MESSAGE_LOG_CAPACITY,
            parse_mode: ParseMode::default(),
            max_flood_wait_secs: defaults::MAX_FLOOD_WAIT_SECS,
        }
    }
}

/// Anthropic completion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub model: String,
    /// Overrides the per-model default when set
    pub max_tokens: Option<u32>,
    /// Enables extended thinking with this budget
    pub thinking_budget: Option<u32>,
    pub max_retries: u32,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl AnthropicConfig {
    /// `max_tokens` sent for the configured model
    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens
            .unwrap_or_else(|| max_tokens_for(&self.model))
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: defaults::ANTHROPIC_BASE_URL.to_string(),
            api_version: defaults::ANTHROPIC_API_VERSION.to_string(),
            model: AnthropicModel::DEFAULT.id().to_string(),
            max_tokens: None,
            thinking_budget: None,
            max_retries: 3,
            connect_timeout_secs: 30,
            request_timeout_secs: 600,
        }
    }
}

/// Conversation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    pub trigger_word: String,
    pub system_prompt: String,
    pub cache_capacity: usize,
    pub max_message_len: usize,
    pub step_delay_ms: u64,
    pub anomaly_delay_ms: u64,
    pub error_notice: String,
}

impl ConversationConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn anomaly_delay(&self) -> Duration {
        Duration::from_millis(self.anomaly_delay_ms)
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            trigger_word: DEFAULT_TRIGGER_WORD.to_string(),
            system_prompt: defaults::SYSTEM_PROMPT.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_message_len: TELEGRAM_MAX_MESSAGE_LENGTH,
            step_delay_ms: defaults::TRAVERSAL_STEP_DELAY_MS,
            anomaly_delay_ms: defaults::TRAVERSAL_ANOMALY_DELAY_MS,
            error_notice: defaults::ERROR_NOTICE.to_string(),
        }
    }
}

/// Complete bot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    pub anthropic: AnthropicConfig,
    pub conversation: ConversationConfig,
    pub workers: usize,
    /// Chat that receives debug reports in addition to the log
    pub debug_chat_id: Option<ChatId>,
    pub fallback_handle: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            anthropic: AnthropicConfig::default(),
            conversation: ConversationConfig::default(),
            workers: defaults::DEFAULT_WORKERS,
            debug_chat_id: None,
            fallback_handle: defaults::FALLBACK_BOT_HANDLE.to_string(),
        }
    }
}

impl BotConfig {
    /// Reject configurations the bot cannot run with
    pub fn validate(&self) -> BotResult<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(BotError::config_with_context(
                "Telegram bot token is missing",
                "Set TG_BOT_TOKEN",
            ));
        }
        if self.anthropic.api_key.trim().is_empty() {
            return Err(BotError::config_with_context(
                "Anthropic api_key is missing",
                "Set ANTHROPIC_API_KEY",
            ));
        }
        if self.conversation.trigger_word.trim().is_empty() {
            return Err(BotError::config("Trigger word must not be empty"));
        }
        if self.conversation.cache_capacity == 0 {
            return Err(BotError::config("Conversation cache capacity must be positive"));
        }
        if self.conversation.max_message_len == 0 {
            return Err(BotError::config("Maximum message length must be positive"));
        }
        if self.workers == 0 {
            return Err(BotError::config("Worker count must be positive"));
        }
        if self.anthropic.model.trim().is_empty() {
            return Err(BotError::config("Model identifier must not be empty"));
        }
        if let Some(budget) = self.anthropic.thinking_budget {
            let max_tokens = self.anthropic.effective_max_tokens();
            if budget >= max_tokens {
                return Err(BotError::config_with_context(
                    format!(
                        "Thinking budget {} must be below max_tokens {}",
                        budget, max_tokens
                    ),
                    "Lower BYDLAN_THINKING_BUDGET or raise BYDLAN_MAX_TOKENS",
                ));
            }
        }
        Ok(())
    }
}
