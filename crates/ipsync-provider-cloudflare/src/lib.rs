// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `ipsync_core::DnsProvider`.
//
// ## Behavior
//
// - ✅ Lists every zone visible to the token, following pagination to the end
// - ✅ Lists every record of a zone, following pagination to the end
// - ✅ Patches record content only (`PATCH`, so TTL/proxied settings are kept)
// - ✅ Fails rather than return a partial listing
// - ✅ HTTP status codes mapped onto the ipsync error taxonomy (401/403, 429, 5xx)
// - ❌ NO retry or backoff (the next scheduled pass is the retry)
// - ❌ NO caching between calls (every pass re-fetches)
// - ❌ NO record creation (only existing records are managed)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Provider refuses to construct with an empty token
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?page=..&per_page=..`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=..&per_page=..`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

mod types;

use async_trait::async_trait;
use ipsync_core::config::DEFAULT_CLOUDFLARE_API_BASE;
use ipsync_core::traits::DnsProvider;
use ipsync_core::{Error, Record, Result, Zone};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

use types::{CloudflareDnsRecord, CloudflareResponse, CloudflareZone};

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for zone listings (Cloudflare maximum is 50)
const ZONES_PER_PAGE: u32 = 50;

/// Page size for record listings
const RECORDS_PER_PAGE: u32 = 100;

/// Upper bound on pages followed for one listing
const MAX_PAGES: u32 = 1000;

const PROVIDER: &str = "cloudflare";

/// Cloudflare DNS provider
///
/// Stateless and single-shot: each trait call maps to the API requests it
/// needs and nothing more. Safe to share across concurrent calls.
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a provider with its own HTTP client against the public API
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:Read and DNS:Edit permissions
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(client, api_token, DEFAULT_CLOUDFLARE_API_BASE)
    }

    /// Create a provider on an injected HTTP client
    ///
    /// The client's timeout bounds every request this provider makes.
    pub fn with_client(
        client: reqwest::Client,
        api_token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        Ok(Self {
            api_token,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch every page of a list endpoint
    ///
    /// Fails with a provider error if the collected item count disagrees with
    /// the reported `total_count`.
    async fn get_all<T: DeserializeOwned>(&self, path: &str, per_page: u32) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut expected_total = None;
        let mut page = 1;

        loop {
            let url = format!(
                "{}{}?page={}&per_page={}",
                self.api_base, path, page, per_page
            );
            let response: CloudflareResponse<Vec<T>> =
                self.send(self.client.get(&url), path).await?;

            let info = response.result_info;
            let batch = response.result.ok_or_else(|| {
                Error::provider(PROVIDER, "Invalid response format: result is missing")
            })?;
            items.extend(batch);

            let Some(info) = info else {
                break;
            };
            expected_total = info.total_count.or(expected_total);

            let total_pages = info.total_pages.unwrap_or(1);
            if page >= total_pages {
                break;
            }
            if page >= MAX_PAGES {
                return Err(Error::provider(
                    PROVIDER,
                    format!("{} reports more than {} pages", path, MAX_PAGES),
                ));
            }
            page += 1;
        }

        if let Some(total) = expected_total
            && items.len() != total
        {
            return Err(Error::provider(
                PROVIDER,
                format!(
                    "Partial listing for {}: got {} of {} item(s)",
                    path,
                    items.len(),
                    total
                ),
            ));
        }

        tracing::debug!("{} returned {} item(s) over {} page(s)", path, items.len(), page);
        Ok(items)
    }

    /// Send an authenticated request and unwrap the Cloudflare envelope
    ///
    /// # Errors
    ///
    /// - Transport failure → `Error::Network`
    /// - 401/403 or an authentication error code → `Error::Authentication`
    /// - Anything else unexpected → `Error::Provider`
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<CloudflareResponse<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::network(format!("Cloudflare request failed ({}): {}", what, e)))?;

        let status = response.status();
        tracing::debug!("{} -> {}", what, status);

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read Cloudflare response: {}", e)))?;

        if !status.is_success() {
            return Err(map_status(status, &body, what));
        }

        let envelope: CloudflareResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider(PROVIDER, format!("Failed to parse response for {}: {}", what, e))
        })?;

        if !envelope.success {
            let message = envelope.first_error();
            return Err(if envelope.is_auth_failure() {
                Error::auth(format!("Cloudflare rejected the API token: {}", message))
            } else {
                Error::provider(PROVIDER, format!("{} failed: {}", what, message))
            });
        }

        Ok(envelope)
    }
}

/// Map a non-2xx status onto the error taxonomy
fn map_status(status: StatusCode, body: &str, what: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions. Status: {}",
            status
        )),
        429 => Error::provider(
            PROVIDER,
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            PROVIDER,
            format!("Cloudflare server error (transient): {} - {}", status, body),
        ),
        _ => Error::provider(PROVIDER, format!("{} failed: {} - {}", what, status, body)),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// # API Call
    ///
    /// ```http
    /// GET /zones?page=1&per_page=50
    /// Authorization: Bearer <token>
    /// ```
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let zones: Vec<CloudflareZone> = self.get_all("/zones", ZONES_PER_PAGE).await?;
        Ok(zones.into_iter().map(Zone::from).collect())
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?page=1&per_page=100
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        let path = format!("/zones/{}/dns_records", zone_id);
        let records: Vec<CloudflareDnsRecord> = self.get_all(&path, RECORDS_PER_PAGE).await?;
        Ok(records.into_iter().map(Record::from).collect())
    }

    /// # API Call
    ///
    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    ///
    /// { "content": "1.2.3.4" }
    /// ```
    async fn patch_record(&self, zone_id: &str, record_id: &str, new_content: &str) -> Result<String> {
        let path = format!("/zones/{}/dns_records/{}", zone_id, record_id);
        let url = format!("{}{}", self.api_base, path);
        let payload = serde_json::json!({ "content": new_content });

        let response: CloudflareResponse<CloudflareDnsRecord> = self
            .send(self.client.patch(&url).json(&payload), &path)
            .await?;

        let record = response.result.ok_or_else(|| {
            Error::provider(PROVIDER, "Invalid response format: result is missing")
        })?;

        tracing::info!("DNS record updated: {} -> {}", record.name, record.content);
        Ok(record.name)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
