//! Debug-report capability
//!
//! Anomalies (ancestors without an author, authors without a name) and
//! handler failures are reported here. Reporting is fire-and-forget: an
//! implementation must never fail the caller.

mod chat_reporter;

pub use chat_reporter::ChatDebugReporter;

use async_trait::async_trait;

/// Sink for diagnostic reports
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DebugReporter: Send + Sync {
    /// Record `text`; failures are swallowed by the implementation
    async fn report(&self, text: &str);
}

/// Reporter that writes every report to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

#[async_trait]
impl DebugReporter for TracingReporter {
    async fn report(&self, text: &str) {
        tracing::info!(message = %text, "debug report");
    }
}
