//! Cloudflare API v4 wire types

use ipsync_core::{Record, Zone};
use serde::Deserialize;

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<CloudflareError>,
    pub result: Option<T>,
    pub result_info: Option<ResultInfo>,
}

impl<T> CloudflareResponse<T> {
    /// First reported error as `"<code>: <message>"`
    pub fn first_error(&self) -> String {
        self.errors
            .first()
            .map(|e| format!("{}: {}", e.code, e.message))
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    /// Whether any reported error is an authentication failure
    pub fn is_auth_failure(&self) -> bool {
        self.errors
            .iter()
            .any(|e| AUTH_ERROR_CODES.contains(&e.code))
    }
}

/// 9109: invalid access token, 10000: authentication error
const AUTH_ERROR_CODES: &[i64] = &[9109, 10000];

#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareError {
    pub code: i64,
    pub message: String,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct ResultInfo {
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareZone {
    pub id: String,
    pub name: String,
}

impl From<CloudflareZone> for Zone {
    fn from(zone: CloudflareZone) -> Self {
        Zone::new(zone.id, zone.name)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CloudflareDnsRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type")]
    pub record_type: String,
}

impl From<CloudflareDnsRecord> for Record {
    fn from(record: CloudflareDnsRecord) -> Self {
        Record::new(record.id, record.name, record.content, record.record_type)
    }
}
