//! Built-in notification sinks

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::NotificationSink;

/// Sink that drops every message
///
/// Used when no notification channel is configured; messages still reach the
/// log at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    async fn send(&self, message: &str) -> Result<()> {
        tracing::debug!("Notification (discarded): {}", message);
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "noop"
    }
}
