//! Contract Test: Partial Patch Failure
//!
//! This test verifies that patches are independent.
//!
//! Constraints verified:
//! - A failing patch does not prevent other patches in the same pass
//! - Successful patches are reported, not rolled back
//! - Each failure is reported individually
//! - A failing notification sink never fails the pass
//!
//! If this test fails, one bad record can hide or undo work on others.

mod common;

use common::*;
use ipsync_core::{PassOutcome, Record};

fn provider() -> MockDnsProvider {
    MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", Record::a("r1", "a.example.com", "1.1.1.1"))
        .with_record("z1", Record::a("r2", "b.example.com", "1.1.1.1"))
        .failing_patch("r2")
}

#[tokio::test]
async fn failing_patch_does_not_block_other_patch() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = provider();
    let sink = RecordingSink::new();

    let reconciler = reconciler(
        &ip_source,
        &provider,
        &sink,
        &minimal_config("a.example.com,b.example.com"),
    );
    let outcome = reconciler.run_pass().await;
    let report = outcome.report().expect("partial failure still completes the pass");

    // Both patches were attempted
    assert_eq!(provider.calls().patches().len(), 2);

    assert_eq!(report.updated, vec!["a.example.com"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].record_name, "b.example.com");
    assert!(report.failed[0].error.contains("timed out"));

    // Notification reflects both outcomes
    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Updated a.example.com to 2.2.2.2"));
    assert!(messages[0].contains("Failed to update b.example.com"));
}

#[tokio::test]
async fn failing_sink_does_not_fail_pass() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = MockDnsProvider::new()
        .with_zone("z1", "example.com")
        .with_record("z1", Record::a("r1", "a.example.com", "1.1.1.1"));
    let sink = RecordingSink::failing();

    let reconciler = reconciler(&ip_source, &provider, &sink, &minimal_config("a.example.com"));

    match reconciler.run_pass().await {
        PassOutcome::Completed(report) => assert_eq!(report.updated, vec!["a.example.com"]),
        other => panic!("notification failure changed the outcome: {:?}", other),
    }
    assert_eq!(sink.messages().len(), 1, "delivery was attempted");
}

#[tokio::test]
async fn ip_report_notifies_and_survives_failing_sink() {
    let ip_source = StaticIpSource::new("2.2.2.2");
    let provider = MockDnsProvider::new();
    let sink = RecordingSink::failing();

    let reconciler = reconciler(&ip_source, &provider, &sink, &minimal_config("a.example.com"));
    let ip = tokio_test::assert_ok!(reconciler.report_ip().await);

    assert_eq!(ip.to_string(), "2.2.2.2");
    assert_eq!(sink.messages(), vec!["Public IP is 2.2.2.2"]);
    // The IP report never touches the provider
    assert_eq!(provider.calls().list_zones_count(), 0);
}

#[tokio::test]
async fn ip_report_failure_is_notified() {
    let provider = MockDnsProvider::new();
    let sink = RecordingSink::new();

    let reconciler = reconciler(
        &StaticIpSource::unreachable(),
        &provider,
        &sink,
        &minimal_config("a.example.com"),
    );
    tokio_test::assert_err!(reconciler.report_ip().await);

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Public IP check failed"));
}
