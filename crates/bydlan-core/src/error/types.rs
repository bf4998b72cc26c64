//! Core error types and traits

use thiserror::Error;

/// Result type alias for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Unified error trait that all bot errors implement.
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }

    /// Check if this error is retryable
    fn is_retryable(&self) -> bool {
        false
    }
}

/// Main error type for the bot
#[derive(Error, Debug, Clone)]
pub enum BotError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Chat transport errors (send, poll, flood control)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        status_code: Option<u16>,
        /// Seconds the transport asked us to wait before retrying
        retry_after: Option<u64>,
        context: Option<String>,
    },

    /// Completion service errors
    #[error("Completion error: {message}")]
    Completion {
        message: String,
        provider: Option<String>,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
        context: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// HTTP request errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
        context: Option<String>,
    },

    /// Operation timed out
    #[error("Operation timed out after {seconds} seconds")]
    Timeout {
        seconds: u64,
        context: Option<String>,
    },

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

impl BotError {
    /// Whether the error signals flood control / rate limiting
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::Transport {
                status_code,
                retry_after,
                ..
            } => retry_after.is_some() || *status_code == Some(429),
            Self::Http { status_code, .. } => *status_code == Some(429),
            Self::Completion { message, .. } => {
                let lower = message.to_lowercase();
                lower.contains("429") || lower.contains("rate limit")
            }
            _ => false,
        }
    }

    /// Server-provided wait hint, if any
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Transport { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
