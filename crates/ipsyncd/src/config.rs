//! Environment configuration for ipsyncd
//!
//! Every setting comes from an `IPSYNC_*` environment variable. Values are
//! checked here, before the runtime starts, so a bad setting exits with the
//! configuration error code instead of failing a pass later.

use anyhow::{Context, Result};
use ipsync_core::config::{DEFAULT_IP_SOURCE_URL, parse_record_list};
use ipsync_core::{
    IpSourceConfig, NotificationConfig, ProviderConfig, ReconcileConfig, ScheduleConfig,
    SyncConfig,
};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::Level;

const DEFAULT_INTERVAL_SECS: u64 = 600;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 10..=86400;
const HTTP_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=300;

/// Whether patches are issued or only logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    DryRun,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(Mode::DryRun),
            other => anyhow::bail!(
                "IPSYNC_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        }
    }
}

/// Daemon configuration
pub struct Config {
    pub api_token: String,
    pub api_base: Option<String>,
    pub records: BTreeSet<String>,
    pub ip_source_url: String,
    pub webhook_url: Option<String>,
    pub server_name: Option<String>,
    pub reconcile_interval_secs: u64,
    pub ip_report_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub mode: Mode,
    pub log_level: Level,
}

// The token must never reach logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("records", &self.records)
            .field("ip_source_url", &self.ip_source_url)
            .field("webhook", &self.webhook_url.is_some())
            .field("server_name", &self.server_name)
            .field("reconcile_interval_secs", &self.reconcile_interval_secs)
            .field("ip_report_interval_secs", &self.ip_report_interval_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("mode", &self.mode)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Unset and blank are the same thing
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_token = var("IPSYNC_CLOUDFLARE_API_TOKEN").context(
            "IPSYNC_CLOUDFLARE_API_TOKEN is required. \
            Set it via: export IPSYNC_CLOUDFLARE_API_TOKEN=your_token",
        )?;

        let records = var("IPSYNC_RECORDS")
            .map(|raw| parse_record_list(&raw))
            .unwrap_or_default();

        let config = Self {
            api_token: api_token.trim().to_string(),
            api_base: var("IPSYNC_CLOUDFLARE_API_BASE"),
            records,
            ip_source_url: var("IPSYNC_IP_SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_IP_SOURCE_URL.to_string()),
            webhook_url: var("IPSYNC_WEBHOOK_URL"),
            server_name: var("IPSYNC_SERVER_NAME"),
            reconcile_interval_secs: parse_number(
                "IPSYNC_RECONCILE_INTERVAL_SECS",
                var("IPSYNC_RECONCILE_INTERVAL_SECS"),
                DEFAULT_INTERVAL_SECS,
            )?,
            ip_report_interval_secs: parse_number(
                "IPSYNC_IP_REPORT_INTERVAL_SECS",
                var("IPSYNC_IP_REPORT_INTERVAL_SECS"),
                DEFAULT_INTERVAL_SECS,
            )?,
            http_timeout_secs: parse_number(
                "IPSYNC_HTTP_TIMEOUT_SECS",
                var("IPSYNC_HTTP_TIMEOUT_SECS"),
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?,
            mode: var("IPSYNC_MODE")
                .map(|m| m.parse::<Mode>())
                .transpose()?
                .unwrap_or(Mode::Live),
            log_level: parse_log_level(var("IPSYNC_LOG_LEVEL").as_deref().unwrap_or("info"))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks what the core configuration cannot know about: placeholder
    /// tokens, URL schemes, numeric ranges.
    fn validate(&self) -> Result<()> {
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower == "token"
        {
            anyhow::bail!(
                "IPSYNC_CLOUDFLARE_API_TOKEN appears to be a placeholder. \
                Use an actual API token from the Cloudflare dashboard."
            );
        }

        if self.records.is_empty() {
            anyhow::bail!(
                "IPSYNC_RECORDS must contain at least one record. \
                Set it via: export IPSYNC_RECORDS=home.example.com,vpn.example.com"
            );
        }

        if !INTERVAL_RANGE.contains(&self.reconcile_interval_secs) {
            anyhow::bail!(
                "IPSYNC_RECONCILE_INTERVAL_SECS must be between 10 and 86400 seconds. Got: {}",
                self.reconcile_interval_secs
            );
        }

        if self.ip_report_interval_secs != 0
            && !INTERVAL_RANGE.contains(&self.ip_report_interval_secs)
        {
            anyhow::bail!(
                "IPSYNC_IP_REPORT_INTERVAL_SECS must be 0 (disabled) or between 10 and 86400 seconds. Got: {}",
                self.ip_report_interval_secs
            );
        }

        if !HTTP_TIMEOUT_RANGE.contains(&self.http_timeout_secs) {
            anyhow::bail!(
                "IPSYNC_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        if self.ip_source_url.starts_with("http://") {
            eprintln!(
                "WARNING: IPSYNC_IP_SOURCE_URL uses HTTP (not HTTPS). \
                The answer can be tampered with in transit. Consider using HTTPS."
            );
        }

        // Names, URLs and provider settings
        self.to_sync_config()
            .validate()
            .context("Invalid configuration")?;

        Ok(())
    }

    /// Core configuration for the reconciler and scheduler
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            provider: ProviderConfig::Cloudflare {
                api_token: self.api_token.clone(),
                api_base: self.api_base.clone(),
            },
            ip_source: IpSourceConfig {
                url: self.ip_source_url.clone(),
            },
            records: self.records.clone(),
            notification: match &self.webhook_url {
                Some(url) => NotificationConfig::Webhook {
                    url: url.clone(),
                    server_name: self.server_name.clone(),
                },
                None => NotificationConfig::None,
            },
            schedule: ScheduleConfig {
                reconcile_interval_secs: self.reconcile_interval_secs,
                ip_report_interval_secs: self.ip_report_interval_secs,
                ..ScheduleConfig::default()
            },
            reconcile: ReconcileConfig {
                dry_run: self.mode == Mode::DryRun,
            },
        }
    }
}

fn parse_number(key: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds. Got: {}", key, raw)),
        None => Ok(default),
    }
}

fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "IPSYNC_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            raw
        ),
    }
}
