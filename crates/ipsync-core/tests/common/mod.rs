//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles record every call so tests can assert on what the reconciler
//! asked of its collaborators, not only on what it returned.

#![allow(dead_code)]

use ipsync_core::config::{SyncConfig, parse_record_list};
use ipsync_core::error::{Error, Result};
use ipsync_core::traits::{DnsProvider, IpSource, NotificationSink};
use ipsync_core::{Reconciler, Record, Zone};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// An IP source returning a fixed address, or failing like an unreachable service
#[derive(Clone)]
pub struct StaticIpSource {
    ip: Option<IpAddr>,
    resolve_call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: &str) -> Self {
        Self {
            ip: Some(ip.parse().expect("valid test IP")),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every call fails with a network error
    pub fn unreachable() -> Self {
        Self {
            ip: None,
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn resolve(&self) -> Result<IpAddr> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        self.ip
            .ok_or_else(|| Error::network("connection refused"))
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// Calls observed by a [`MockDnsProvider`] (shared between clones)
#[derive(Default)]
pub struct CallLog {
    list_zones: AtomicUsize,
    list_records: Mutex<Vec<String>>,
    patches: Mutex<Vec<(String, String, String)>>,
}

impl CallLog {
    pub fn list_zones_count(&self) -> usize {
        self.list_zones.load(Ordering::SeqCst)
    }

    /// Zone ids passed to list_records(), in call order
    pub fn record_lookups(&self) -> Vec<String> {
        self.list_records.lock().unwrap().clone()
    }

    /// `(zone_id, record_id, new_content)` per patch_record() call
    pub fn patches(&self) -> Vec<(String, String, String)> {
        self.patches.lock().unwrap().clone()
    }
}

/// Lets a test hold a call open and observe that it started
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// An in-memory DnsProvider with per-call failure injection
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    zones: Vec<Zone>,
    records: HashMap<String, Vec<Record>>,
    fail_zone_lookup: bool,
    fail_record_lookup: HashSet<String>,
    fail_patch: HashSet<String>,
    zone_gate: Option<Gate>,
    calls: Arc<CallLog>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, id: &str, name: &str) -> Self {
        self.zones.push(Zone::new(id, name));
        self
    }

    pub fn with_record(mut self, zone_id: &str, record: Record) -> Self {
        self.records
            .entry(zone_id.to_string())
            .or_default()
            .push(record);
        self
    }

    /// list_zones() fails with an authentication error
    pub fn failing_zone_lookup(mut self) -> Self {
        self.fail_zone_lookup = true;
        self
    }

    /// list_records() fails for this zone
    pub fn failing_record_lookup(mut self, zone_id: &str) -> Self {
        self.fail_record_lookup.insert(zone_id.to_string());
        self
    }

    /// patch_record() fails for this record
    pub fn failing_patch(mut self, record_id: &str) -> Self {
        self.fail_patch.insert(record_id.to_string());
        self
    }

    /// list_zones() signals `entered` and waits for `release`
    pub fn gated(mut self, gate: Gate) -> Self {
        self.zone_gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Arc<CallLog> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.calls.list_zones.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.zone_gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.fail_zone_lookup {
            return Err(Error::auth("Invalid API token"));
        }
        Ok(self.zones.clone())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        self.calls
            .list_records
            .lock()
            .unwrap()
            .push(zone_id.to_string());

        if self.fail_record_lookup.contains(zone_id) {
            return Err(Error::provider("mock", "result is not an array"));
        }
        Ok(self.records.get(zone_id).cloned().unwrap_or_default())
    }

    async fn patch_record(&self, zone_id: &str, record_id: &str, new_content: &str) -> Result<String> {
        self.calls.patches.lock().unwrap().push((
            zone_id.to_string(),
            record_id.to_string(),
            new_content.to_string(),
        ));

        if self.fail_patch.contains(record_id) {
            return Err(Error::network("operation timed out"));
        }

        self.records
            .get(zone_id)
            .and_then(|records| records.iter().find(|r| r.id == record_id))
            .map(|record| record.name.clone())
            .ok_or_else(|| Error::provider("mock", "record not found"))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A NotificationSink that keeps every message, optionally failing each send
#[derive(Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every send fails (messages are still recorded)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(Error::notification("webhook returned 500"));
        }
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(records: &str) -> SyncConfig {
    SyncConfig::new("test-token", parse_record_list(records))
}

/// Build a reconciler over clones of the given doubles
pub fn reconciler(
    ip_source: &StaticIpSource,
    provider: &MockDnsProvider,
    sink: &RecordingSink,
    config: &SyncConfig,
) -> Reconciler {
    Reconciler::new(
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        Box::new(sink.clone()),
        config,
    )
    .expect("reconciler construction succeeds")
}
