//! Configuration for the bot
//!
//! Settings come from environment variables (optionally seeded from a
//! `.env` file); every value has a default matching the reference
//! deployment except the two credentials.

pub mod defaults;
mod env_loader;
mod model;

pub use env_loader::{load_dotenv, load_from_env, load_from_lookup};
pub use model::{AnthropicConfig, BotConfig, ConversationConfig, ParseMode, TelegramConfig};
