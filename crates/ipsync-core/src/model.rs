//! Domain model for a reconciliation pass
//!
//! Everything here is re-fetched every pass; nothing outlives it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// A provider-side grouping of records for a domain suffix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-assigned identifier
    pub id: String,
    /// Domain suffix, e.g. `example.com`
    pub name: String,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One DNS entry within a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Provider-assigned identifier
    pub id: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record content (an address for A/AAAA records)
    pub content: String,
    /// Record type as reported by the provider (`A`, `AAAA`, `CNAME`, ...)
    #[serde(rename = "type")]
    pub record_type: String,
}

impl Record {
    /// Create an `A` record
    pub fn a(id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, name, content, "A")
    }

    /// Create an `AAAA` record
    pub fn aaaa(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(id, name, content, "AAAA")
    }

    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        record_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
            record_type: record_type.into(),
        }
    }

    /// Whether this record can hold `ip` (A for IPv4, AAAA for IPv6)
    pub fn holds_family_of(&self, ip: IpAddr) -> bool {
        match ip {
            IpAddr::V4(_) => self.record_type.eq_ignore_ascii_case("A"),
            IpAddr::V6(_) => self.record_type.eq_ignore_ascii_case("AAAA"),
        }
    }

    /// Whether the record content already points at `ip`.
    ///
    /// Compared as parsed addresses; content that is not an address is never in sync.
    pub fn is_in_sync(&self, ip: IpAddr) -> bool {
        self.content
            .trim()
            .parse::<IpAddr>()
            .is_ok_and(|current| current == ip)
    }
}

/// A stale record and the content it must be patched to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTask {
    pub zone: Zone,
    pub record: Record,
    pub new_content: String,
}

/// Why a desired name produced no update task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No zone visible to the token is a suffix of the name
    NoMatchingZone,
    /// The zone has no A/AAAA record with this name
    NoMatchingRecord,
}

/// Patch failure for a single record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPatch {
    pub record_name: String,
    pub error: String,
}

/// Summary of one completed reconciliation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassReport {
    /// Public IP observed at the start of the pass
    pub public_ip: IpAddr,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records patched to `public_ip` (or that would be, in dry-run mode)
    pub updated: Vec<String>,
    pub failed: Vec<FailedPatch>,
    /// Desired names whose record already points at `public_ip`
    pub in_sync: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
    pub dry_run: bool,
}

impl PassReport {
    /// True when the pass neither changed nor failed to change anything
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty() && self.failed.is_empty()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at.signed_duration_since(self.started_at)
    }
}
