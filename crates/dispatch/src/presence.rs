//! One-shot presence publisher, run after command registration.

use {
    cadence_config::PresenceConfig,
    tracing::{info, warn},
};

use crate::transport::PresenceSink;

/// Publishes the configured presence once registration is done.
#[derive(Debug, Clone, Default)]
pub struct PresencePublisher {
    presence: PresenceConfig,
}

impl PresencePublisher {
    pub fn new(presence: PresenceConfig) -> Self {
        Self { presence }
    }

    pub fn presence(&self) -> &PresenceConfig {
        &self.presence
    }

    /// Returns whether the presence was set. Failures are logged, not retried.
    pub async fn publish(&self, sink: &dyn PresenceSink) -> bool {
        match sink.set_presence(&self.presence).await {
            Ok(()) => {
                info!(
                    status = ?self.presence.status,
                    activity = self.presence.activity.as_ref().map(|a| a.name.as_str()),
                    "presence published"
                );
                true
            },
            Err(e) => {
                warn!(error = %e, "failed to publish presence");
                false
            },
        }
    }
}
