// # IP Source Trait
//
// Defines the interface for discovering the caller's public IP address.
//
// ## Implementations
//
// - HTTP IP-echo service: `ipsync-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ipsync_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let ip = source.resolve().await?;
//     println!("public IP: {}", ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for public IP source implementations
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Contract
///
/// - One outbound request per call, no caching: every pass observes a fresh IP
/// - No retries; the next scheduled pass is the retry
/// - Unreachable service or non-2xx response → [`crate::Error::Network`]
/// - A body that is not an address → [`crate::Error::Provider`]
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the address currently visible to the outside world
    async fn resolve(&self) -> Result<IpAddr, crate::Error>;

    /// Name of the source (for logging/debugging)
    fn source_name(&self) -> &str;
}
