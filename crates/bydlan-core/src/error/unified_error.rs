//! UnifiedError trait implementation for BotError

use super::types::{BotError, UnifiedError};

impl UnifiedError for BotError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "BYDLAN_CONFIG",
            Self::Transport { .. } => "BYDLAN_TRANSPORT",
            Self::Completion { .. } => "BYDLAN_COMPLETION",
            Self::Io { .. } => "BYDLAN_IO",
            Self::Json { .. } => "BYDLAN_JSON",
            Self::Http { .. } => "BYDLAN_HTTP",
            Self::Timeout { .. } => "BYDLAN_TIMEOUT",
            Self::Other { .. } => "BYDLAN_OTHER",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. } => message,
            Self::Transport { message, .. } => message,
            Self::Completion { message, .. } => message,
            Self::Io { message, .. } => message,
            Self::Json { message, .. } => message,
            Self::Http { message, .. } => message,
            Self::Timeout { .. } => "Operation timed out",
            Self::Other { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            Self::Transport { context, .. } => context.as_deref(),
            Self::Completion { context, .. } => context.as_deref(),
            Self::Io { context, .. } => context.as_deref(),
            Self::Json { context, .. } => context.as_deref(),
            Self::Http { context, .. } => context.as_deref(),
            Self::Timeout { context, .. } => context.as_deref(),
            Self::Other { context, .. } => context.as_deref(),
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status_code, .. } => {
                !matches!(status_code, Some(400) | Some(401) | Some(403) | Some(404))
            }
            Self::Timeout { .. } => true,
            Self::Transport { .. } => self.is_rate_limited(),
            Self::Completion { message, .. } => {
                let lower = message.to_lowercase();
                lower.contains("429")
                    || lower.contains("500")
                    || lower.contains("502")
                    || lower.contains("503")
                    || lower.contains("504")
                    || lower.contains("529")
                    || lower.contains("overloaded")
                    || lower.contains("rate limit")
                    || lower.contains("timeout")
                    || lower.contains("connection")
                    || lower.contains("network")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BotError::config("x").error_code(), "BYDLAN_CONFIG");
        assert_eq!(BotError::completion("x").error_code(), "BYDLAN_COMPLETION");
        assert_eq!(BotError::flood_wait("x", 1).error_code(), "BYDLAN_TRANSPORT");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(BotError::completion("Anthropic API error (status 529): overloaded").is_retryable());
        assert!(BotError::completion("status 429 Too Many Requests").is_retryable());
        assert!(!BotError::completion("status 401 Unauthorized").is_retryable());
        assert!(BotError::flood_wait("Too Many Requests", 3).is_retryable());
        assert!(!BotError::transport("Bad Request: chat not found").is_retryable());
        assert!(!BotError::config("missing TG_BOT_TOKEN").is_retryable());
    }

    #[test]
    fn test_rate_limit_detection() {
        let err = BotError::flood_wait("Too Many Requests: retry after 7", 7);
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(7));
        assert!(!BotError::transport("boom").is_rate_limited());
    }

    #[test]
    fn test_context_is_attached() {
        let err = BotError::completion("bad").with_context("while answering chat 42");
        assert_eq!(err.context(), Some("while answering chat 42"));
        assert_eq!(err.message(), "bad");
    }
}
