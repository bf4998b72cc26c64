//! Constructor methods for BotError

use super::types::BotError;

impl BotError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: None,
            retry_after: None,
            context: None,
        }
    }

    /// Create a transport error with the status code reported by the chat API
    pub fn transport_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: Some(status_code),
            retry_after: None,
            context: None,
        }
    }

    /// Create a flood-control error carrying the server's wait hint
    pub fn flood_wait(message: impl Into<String>, retry_after: u64) -> Self {
        Self::Transport {
            message: message.into(),
            status_code: Some(429),
            retry_after: Some(retry_after),
            context: None,
        }
    }

    /// Create a new completion error
    pub fn completion(message: impl Into<String>) -> Self {
        Self::Completion {
            message: message.into(),
            provider: None,
            context: None,
        }
    }

    /// Create a completion error with provider
    pub fn completion_with_provider(message: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::Completion {
            message: message.into(),
            provider: Some(provider.into()),
            context: None,
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            context: None,
        }
    }

    /// Create a JSON error with message
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to any error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Config { context: c, .. } => *c = ctx,
            Self::Transport { context: c, .. } => *c = ctx,
            Self::Completion { context: c, .. } => *c = ctx,
            Self::Io { context: c, .. } => *c = ctx,
            Self::Json { context: c, .. } => *c = ctx,
            Self::Http { context: c, .. } => *c = ctx,
            Self::Timeout { context: c, .. } => *c = ctx,
            Self::Other { context: c, .. } => *c = ctx,
        }
        self
    }
}
