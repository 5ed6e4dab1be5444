//! Human-readable notification text

use std::net::IpAddr;

use crate::error::Error;
use crate::model::{PassReport, SkipReason};

/// Summary of a completed pass
///
/// One line per outcome kind; a pass that changed nothing says so explicitly.
pub fn pass_message(report: &PassReport) -> String {
    let mut lines = Vec::new();
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if report.is_noop() {
        lines.push(format!(
            "{}No changes: {} record(s) already point to {}",
            prefix,
            report.in_sync.len(),
            report.public_ip
        ));
    }

    if !report.updated.is_empty() {
        let verb = if report.dry_run { "Would update" } else { "Updated" };
        lines.push(format!(
            "{}{} {} to {}",
            prefix,
            verb,
            report.updated.join(", "),
            report.public_ip
        ));
    }

    if !report.failed.is_empty() {
        let failures: Vec<String> = report
            .failed
            .iter()
            .map(|f| format!("{} ({})", f.record_name, f.error))
            .collect();
        lines.push(format!(
            "{}Failed to update {} to {}",
            prefix,
            failures.join(", "),
            report.public_ip
        ));
    }

    if !report.skipped.is_empty() {
        let skipped: Vec<String> = report
            .skipped
            .iter()
            .map(|(name, reason)| match reason {
                SkipReason::NoMatchingZone => format!("{} (no matching zone)", name),
                SkipReason::NoMatchingRecord => format!("{} (no matching record)", name),
            })
            .collect();
        lines.push(format!("{}Skipped {}", prefix, skipped.join(", ")));
    }

    lines.join("\n")
}

/// Notification for a pass that aborted before patching
pub fn failure_message(error: &Error) -> String {
    format!("DNS sync failed: {}", error)
}

/// Periodic public IP report
pub fn ip_report_message(ip: IpAddr) -> String {
    format!("Public IP is {}", ip)
}

/// Periodic public IP report that could not resolve the address
pub fn ip_report_failure_message(error: &Error) -> String {
    format!("Public IP check failed: {}", error)
}
