// # HTTP IP Source
//
// This crate resolves the host's public IP address through a plain-text
// "what is my IP" service such as ipify.
//
// ## Behavior
//
// - One GET per `resolve()` call, no caching (a pass must see the current address)
// - Body is trimmed and parsed as IPv4 or IPv6
// - Timeouts come from the injected HTTP client
//
// ## Errors
//
// - Transport failure or non-2xx status → `Error::Network`
// - Body that is not an IP address → `Error::Provider`

use ipsync_core::config::DEFAULT_IP_SOURCE_URL;
use ipsync_core::traits::IpSource;
use ipsync_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default request timeout when the source builds its own client
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Public IP lookup over HTTP
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL that answers with the caller's IP as plain text
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a source with its own HTTP client
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, url))
    }

    /// Create a source on an injected HTTP client
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpIpSource {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_IP_SOURCE_URL)
    }
}

/// Parse a response body such as `"203.0.113.7\n"`
fn parse_ip(body: &str) -> Result<IpAddr> {
    let text = body.trim();
    text.parse()
        .map_err(|_| Error::provider("http", format!("Invalid IP address: {:?}", text)))
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn resolve(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("IP lookup request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!(
                "IP lookup service returned HTTP {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read IP lookup response: {}", e)))?;

        let ip = parse_ip(&body)?;
        tracing::debug!("Resolved public IP {} via {}", ip, self.url);
        Ok(ip)
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}
