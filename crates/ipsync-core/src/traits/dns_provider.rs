// # DNS Provider Trait
//
// Defines the interface for reading zone/record topology and patching records.
//
// ## Implementations
//
// - Cloudflare: `ipsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ipsync_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.list_zones().await?;
//     for zone in &zones {
//         let records = provider.list_records(&zone.id).await?;
//         println!("{}: {} record(s)", zone.name, records.len());
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use crate::model::{Record, Zone};

/// Trait for DNS provider implementations
///
/// Providers are stateless request adapters. The reconciler decides what is
/// stale and what to patch; a provider only translates each call into API
/// requests and maps failures onto the error taxonomy:
///
/// - Token rejected → [`crate::Error::Authentication`]
/// - Transport failure → [`crate::Error::Network`]
/// - Malformed, partial or unexpected response → [`crate::Error::Provider`]
///
/// Providers must not retry, cache between calls, or spawn tasks. Calls for
/// different zones and records are issued concurrently by the reconciler, so
/// implementations must be thread-safe.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every zone visible to the configured token
    ///
    /// Must return the complete set; a provider that paginates fetches every
    /// page before returning and fails rather than return a partial list.
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// List every record in a zone
    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>, crate::Error>;

    /// Replace a record's content
    ///
    /// # Returns
    ///
    /// The name of the updated record as reported by the provider
    async fn patch_record(
        &self,
        zone_id: &str,
        record_id: &str,
        new_content: &str,
    ) -> Result<String, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
