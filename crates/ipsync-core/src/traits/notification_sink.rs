// # Notification Sink Trait
//
// Free-text side channel for pass summaries and IP reports.
//
// ## Implementations
//
// - Webhook: `ipsync-notify-webhook` crate
// - No-op: [`crate::notify::NoopSink`]

use async_trait::async_trait;

/// Trait for notification sinks
///
/// Delivery is best-effort. The reconciler logs a failed delivery and carries
/// on; a sink error never changes the outcome of a pass.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a message
    async fn send(&self, message: &str) -> Result<(), crate::Error>;

    /// Name of the sink (for logging/debugging)
    fn sink_name(&self) -> &'static str;
}
