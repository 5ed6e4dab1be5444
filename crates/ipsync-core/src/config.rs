//! Configuration types for ipsync
//!
//! This module defines all configuration structures used throughout the workspace.
//! Loading (environment variables) is the daemon's job; everything here is
//! format-agnostic and validated with [`SyncConfig::validate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default IP-echo service
pub const DEFAULT_IP_SOURCE_URL: &str = "https://api.ipify.org";

/// Cloudflare API v4 base URL
pub const DEFAULT_CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public IP source configuration
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// Desired record names, normalized
    pub records: BTreeSet<String>,

    /// Where pass summaries and IP reports go
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Timer settings
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Reconciler settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,
}

impl SyncConfig {
    /// Create a configuration for the given token and records with defaults elsewhere
    pub fn new(api_token: impl Into<String>, records: BTreeSet<String>) -> Self {
        Self {
            provider: ProviderConfig::Cloudflare {
                api_token: api_token.into(),
                api_base: None,
            },
            ip_source: IpSourceConfig::default(),
            records,
            notification: NotificationConfig::default(),
            schedule: ScheduleConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.records.is_empty() {
            return Err(crate::Error::config("No records configured"));
        }

        for record in &self.records {
            validate_domain_name(record)?;
        }

        self.provider.validate()?;
        self.ip_source.validate()?;
        self.notification.validate()?;
        self.schedule.validate()?;

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token with Zone:Read and DNS:Edit permissions
        api_token: String,
        /// API base override (defaults to [`DEFAULT_CLOUDFLARE_API_BASE`])
        #[serde(default)]
        api_base: Option<String>,
    },
}

// The token must never reach logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Cloudflare { api_base, .. } => f
                .debug_struct("Cloudflare")
                .field("api_token", &"<REDACTED>")
                .field("api_base", api_base)
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare { api_token, api_base } => {
                if api_token.trim().is_empty() {
                    return Err(crate::Error::config("Cloudflare API token cannot be empty"));
                }
                if let Some(base) = api_base {
                    validate_http_url("Cloudflare API base", base)?;
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

/// Public IP source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpSourceConfig {
    /// URL returning the caller's address as plain text
    pub url: String,
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_http_url("IP source URL", &self.url)
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_IP_SOURCE_URL.to_string(),
        }
    }
}

/// Notification channel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationConfig {
    /// Discard every message
    #[default]
    None,

    /// Discord-compatible webhook
    Webhook {
        /// Webhook URL
        url: String,
        /// Prefix identifying this host in messages
        #[serde(default)]
        server_name: Option<String>,
    },
}

impl NotificationConfig {
    /// Validate the notification configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            NotificationConfig::None => Ok(()),
            NotificationConfig::Webhook { url, .. } => validate_http_url("Webhook URL", url),
        }
    }
}

/// Timer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Interval between reconciliation passes (in seconds)
    #[serde(default = "default_interval_secs")]
    pub reconcile_interval_secs: u64,

    /// Interval between public IP reports (in seconds, 0 disables)
    #[serde(default = "default_interval_secs")]
    pub ip_report_interval_secs: u64,

    /// Run both actions immediately at startup instead of after one interval
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,

    /// How long shutdown waits for an in-flight pass (in seconds)
    #[serde(default = "default_drain_timeout_secs")]
    pub drain_timeout_secs: u64,
}

impl ScheduleConfig {
    /// Validate the timer configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.reconcile_interval_secs == 0 {
            return Err(crate::Error::config("Reconcile interval must be > 0"));
        }
        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_interval_secs(),
            ip_report_interval_secs: default_interval_secs(),
            run_on_startup: default_run_on_startup(),
            drain_timeout_secs: default_drain_timeout_secs(),
        }
    }
}

/// Reconciler configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Compute and log patches without issuing them
    #[serde(default)]
    pub dry_run: bool,
}

fn default_interval_secs() -> u64 {
    600
}

fn default_run_on_startup() -> bool {
    true
}

fn default_drain_timeout_secs() -> u64 {
    30
}

/// Parse a comma-separated list of record names.
///
/// Whitespace anywhere in the list is ignored, names are lowercased and
/// stripped of a trailing dot, and duplicates collapse.
pub fn parse_record_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|name| {
            name.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
        })
        .map(|name| normalize_name(&name))
        .filter(|name| !name.is_empty())
        .collect()
}

/// Lowercase a DNS name and drop its trailing dot
pub fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length, characters, hyphens.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        // Wildcard records are managed like any other name
        if label == "*" {
            continue;
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn validate_http_url(what: &str, url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config(format!("{} cannot be empty", what)));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            what, url
        )));
    }
    Ok(())
}
