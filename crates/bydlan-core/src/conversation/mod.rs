//! Conversation turns and the bounded conversation cache
//!
//! A conversation is the oldest-first list of role-tagged turns that is sent
//! to the completion service. After every reply the list is cached under the
//! id of the message the bot just sent (the anchor), so the next message that
//! replies to that anchor can skip walking the reply chain.

pub mod cache;
pub mod turn;

pub use cache::{ConversationCache, ConversationCacheStats, ConversationKey, DEFAULT_CACHE_CAPACITY};
pub use turn::{ConversationTurn, TurnRole, compose_user_line};
