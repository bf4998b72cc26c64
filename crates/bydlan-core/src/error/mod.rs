//! Error types for the Bydlan bot
//!
//! Every fallible operation in the workspace returns [`BotResult`]. All errors
//! implement [`UnifiedError`], which provides:
//! - error_code: a stable identifier for logs and debug reports
//! - message: human-readable description
//! - context: optional note about where the error happened
//! - is_retryable: whether a caller may repeat the operation

mod constructors;
mod conversions;
mod types;
mod unified_error;

pub use types::{BotError, BotResult, UnifiedError};
