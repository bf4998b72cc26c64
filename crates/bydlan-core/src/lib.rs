//! Bydlan Core Library
//!
//! Context reconstruction and conversation caching for a group-chat bot that
//! answers reply chains with an LLM, plus the Telegram and Anthropic clients
//! it runs on.

pub mod chat;
pub mod config;
pub mod context;
pub mod conversation;
pub mod debug;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod splitter;
pub mod transport;
pub mod trigger;

// Re-export commonly used types
pub use chat::{Author, ChatId, ChatMessage, MessageId};
pub use config::{AnthropicConfig, BotConfig, ConversationConfig, TelegramConfig};
pub use context::{ContextBuilder, TraversalPacing};
pub use conversation::{ConversationCache, ConversationKey, ConversationTurn, TurnRole};
pub use debug::{ChatDebugReporter, DebugReporter, TracingReporter};
pub use error::{BotError, BotResult};
pub use llm::{AnthropicClient, CompletionProvider, CompletionRequest, CompletionResponse};
pub use orchestrator::{Capabilities, ConversationOrchestrator, HandleOutcome};
pub use splitter::{TELEGRAM_MAX_MESSAGE_LENGTH, split_message};
pub use transport::ChatTransport;
pub use transport::telegram::TelegramTransport;
pub use trigger::{BotIdentity, TriggerEvaluator};
