use crate::config::ConversationConfig;
use std::time::Duration;

/// Delays inserted between ancestor fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalPacing {
    /// Pause after every fetch
    pub step: Duration,
    /// Additional pause after an anomaly was reported
    pub anomaly: Duration,
}

impl TraversalPacing {
    pub fn new(step: Duration, anomaly: Duration) -> Self {
        Self { step, anomaly }
    }

    /// No pauses at all
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub(crate) async fn after_step(&self) {
        pause(self.step).await;
    }

    pub(crate) async fn after_anomaly(&self) {
        pause(self.anomaly).await;
    }
}

impl Default for TraversalPacing {
    fn default() -> Self {
        Self::new(Duration::from_millis(200), Duration::from_millis(300))
    }
}

impl From<&ConversationConfig> for TraversalPacing {
    fn from(config: &ConversationConfig) -> Self {
        Self::new(config.step_delay(), config.anomaly_delay())
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
