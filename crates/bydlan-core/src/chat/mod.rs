//! Chat-side data model shared by the trigger evaluator, the context builder
//! and the transports.

mod types;

pub use types::{Author, ChatId, ChatMessage, MessageId};
