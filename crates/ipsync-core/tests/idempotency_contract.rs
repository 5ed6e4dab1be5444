//! Contract Test: Idempotent Reconciliation
//!
//! This test verifies that a pass patches exactly the stale records.
//!
//! Constraints verified:
//! - Records already pointing at the public IP are never patched
//! - Stale records are patched to the public IP, once each
//! - Desired names without a record are skipped, not created, not errors
//! - Every zone hosting a desired name is looked up
//!
//! If this test fails, the diff step is patching the wrong set of records.

mod common;

use common::*;
use ipsync_core::{PassOutcome, SkipReason};

#[tokio::test]
async fn stale_record_is_patched_to_public_ip() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", ipsync_core::Record::a("r1", "home.example.com", "1.1.1.1"));
    let sink = RecordingSink::new();

    let reconciler = reconciler(&ip_source, &provider, &sink, &minimal_config("home.example.com"));
    let outcome = reconciler.run_pass().await;

    let report = outcome.report().expect("pass completes");
    assert_eq!(report.updated, vec!["home.example.com"]);
    assert!(report.failed.is_empty());

    // Exactly one patch: (z1, r1, 2.2.2.2)
    assert_eq!(
        provider.calls().patches(),
        vec![("z1".to_string(), "r1".to_string(), "2.2.2.2".to_string())]
    );

    assert_eq!(sink.messages(), vec!["Updated home.example.com to 2.2.2.2"]);
}

#[tokio::test]
async fn current_record_issues_zero_patches() {
    let ip_source = StaticIpSource::new("1.1.1.1");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", ipsync_core::Record::a("r1", "home.example.com", "1.1.1.1"));
    let sink = RecordingSink::new();

    let reconciler = reconciler(&ip_source, &provider, &sink, &minimal_config("home.example.com"));
    let outcome = reconciler.run_pass().await;

    let report = outcome.report().expect("pass completes");
    assert!(report.is_noop());
    assert_eq!(report.in_sync, vec!["home.example.com"]);
    assert!(provider.calls().patches().is_empty(), "no patch for an in-sync record");

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("No changes"), "got: {}", messages[0]);
}

#[tokio::test]
async fn repeated_passes_patch_nothing_once_in_sync() {
    let ip_source = StaticIpSource::new("1.1.1.1");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", ipsync_core::Record::a("r1", "home.example.com", "1.1.1.1"));
    let sink = RecordingSink::new();

    let reconciler = reconciler(&ip_source, &provider, &sink, &minimal_config("home.example.com"));
    for _ in 0..3 {
        assert!(matches!(reconciler.run_pass().await, PassOutcome::Completed(_)));
    }

    // Nothing is cached: every pass re-fetches IP, zones and records
    assert_eq!(ip_source.resolve_call_count(), 3);
    assert_eq!(provider.calls().list_zones_count(), 3);
    assert_eq!(provider.calls().record_lookups().len(), 3);
    assert!(provider.calls().patches().is_empty());
}

#[tokio::test]
async fn two_zones_one_stale_one_current() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_zone("z2", "example.org")
        .with_record("z1", ipsync_core::Record::a("r1", "home.example.com", "1.1.1.1"))
        .with_record("z2", ipsync_core::Record::a("r2", "vpn.example.org", "2.2.2.2"));
    let sink = RecordingSink::new();

    let reconciler = reconciler(
        &ip_source,
        &provider,
        &sink,
        &minimal_config("home.example.com, vpn.example.org"),
    );
    let outcome = reconciler.run_pass().await;
    let report = outcome.report().expect("pass completes");

    // Both zones were looked up
    let mut lookups = provider.calls().record_lookups();
    lookups.sort();
    assert_eq!(lookups, vec!["z1", "z2"]);

    // Only the stale one was patched
    assert_eq!(
        provider.calls().patches(),
        vec![("z1".to_string(), "r1".to_string(), "2.2.2.2".to_string())]
    );
    assert_eq!(report.updated, vec!["home.example.com"]);
    assert_eq!(report.in_sync, vec!["vpn.example.org"]);
}

#[tokio::test]
async fn names_without_records_are_skipped_without_error() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", ipsync_core::Record::a("r1", "home.example.com", "2.2.2.2"));
    let sink = RecordingSink::new();

    let reconciler = reconciler(
        &ip_source,
        &provider,
        &sink,
        &minimal_config("missing.example.com,home.unknown.net"),
    );
    let outcome = reconciler.run_pass().await;
    let report = outcome.report().expect("missing names never abort the pass");

    assert!(provider.calls().patches().is_empty());
    assert_eq!(
        report.skipped,
        vec![
            ("home.unknown.net".to_string(), SkipReason::NoMatchingZone),
            ("missing.example.com".to_string(), SkipReason::NoMatchingRecord),
        ]
    );

    // The zone with no desired name at all is never fetched
    assert_eq!(provider.calls().record_lookups(), vec!["z1"]);
}

#[tokio::test]
async fn dry_run_issues_zero_patches() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", ipsync_core::Record::a("r1", "home.example.com", "1.1.1.1"));
    let sink = RecordingSink::new();

    let mut config = minimal_config("home.example.com");
    config.reconcile.dry_run = true;

    let reconciler = reconciler(&ip_source, &provider, &sink, &config);
    let outcome = reconciler.run_pass().await;
    let report = outcome.report().expect("pass completes");

    assert!(report.dry_run);
    assert_eq!(report.updated, vec!["home.example.com"]);
    assert!(provider.calls().patches().is_empty(), "dry run must not patch");
    assert_eq!(
        sink.messages(),
        vec!["[dry-run] Would update home.example.com to 2.2.2.2"]
    );
}

#[tokio::test]
async fn mixed_case_desired_name_matches_its_record() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", ipsync_core::Record::a("r1", "home.example.com", "1.1.1.1"));
    let sink = RecordingSink::new();

    // Built directly, as a library caller or deserialized config would, without parse_record_list
    let records = ["Home.Example.com".to_string()].into_iter().collect();
    let config = ipsync_core::SyncConfig::new("test-token", records);

    let reconciler = reconciler(&ip_source, &provider, &sink, &config);
    assert!(reconciler.records().contains("home.example.com"));

    let outcome = reconciler.run_pass().await;
    let report = outcome.report().expect("pass completes");
    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);
    assert_eq!(
        provider.calls().patches(),
        vec![("z1".to_string(), "r1".to_string(), "2.2.2.2".to_string())]
    );
}
