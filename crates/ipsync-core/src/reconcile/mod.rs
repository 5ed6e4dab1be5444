//! Reconciliation pass
//!
//! The Reconciler is responsible for:
//! - Resolving the current public IP via IpSource
//! - Reading zone/record topology via DnsProvider
//! - Deciding which records are stale
//! - Patching exactly those records
//! - Emitting a summary via NotificationSink
//!
//! ## Pass Flow
//!
//! ```text
//! ResolveIP ──► ListZones ──► ListRecords ──► Diff ──► Patch ──► Notify
//!                              (per zone,              (per task,
//!                               fail-fast)              collect all)
//! ```
//!
//! 1. Resolve the public IP; every later step depends on it
//! 2. List zones once and match each desired name to its zone
//! 3. List records of the relevant zones concurrently; any failure aborts the pass
//! 4. Compute update tasks (records whose content differs from the IP)
//! 5. Patch concurrently; each outcome is kept, nothing is rolled back
//! 6. Notify (best-effort)
//!
//! Only one pass runs at a time. A pass requested while another is in flight
//! is coalesced and makes no provider calls.

pub mod diff;
pub mod guard;
pub mod summary;

use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;

use chrono::Utc;
use futures::future::{join_all, try_join_all};
use tracing::{debug, error, info, warn};

use crate::config::{SyncConfig, normalize_name};
use crate::error::{Error, Result};
use crate::model::{FailedPatch, PassReport, Record, UpdateTask};
use crate::traits::{DnsProvider, IpSource, NotificationSink};

pub use diff::{Diff, ZoneAssignment};
pub use guard::{PassGuard, PassPermit};

/// Outcome of a requested pass
#[derive(Debug)]
pub enum PassOutcome {
    /// The pass ran to the end; individual patches may still have failed
    Completed(PassReport),
    /// The pass stopped before patching anything
    Aborted(Error),
    /// Another pass was in flight; nothing was done
    Coalesced,
}

impl PassOutcome {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            PassOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_coalesced(&self) -> bool {
        matches!(self, PassOutcome::Coalesced)
    }
}

/// Scheduled dynamic-DNS reconciler
///
/// Stateless between passes: every pass re-derives everything from the IP
/// source and the provider. All collaborators are injected.
///
/// ## Threading
///
/// Share through an `Arc`; the internal [`PassGuard`] keeps concurrent
/// callers from running overlapping passes.
pub struct Reconciler {
    /// Public IP source
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and patching records
    provider: Box<dyn DnsProvider>,

    /// Side channel for summaries
    sink: Box<dyn NotificationSink>,

    /// Desired record names
    records: BTreeSet<String>,

    /// Compute and log patches without issuing them
    dry_run: bool,

    /// Single-pass slot
    guard: PassGuard,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ip_source`: Public IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `sink`: Notification sink implementation
    /// - `config`: Validated before use; a configuration error is fatal
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        sink: Box<dyn NotificationSink>,
        config: &SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            sink,
            records: config.records.iter().map(|name| normalize_name(name)).collect(),
            dry_run: config.reconcile.dry_run,
            guard: PassGuard::new(),
        })
    }

    /// Desired record names managed by this reconciler
    pub fn records(&self) -> &BTreeSet<String> {
        &self.records
    }

    /// Whether a pass currently holds the pass slot
    pub fn is_pass_in_flight(&self) -> bool {
        self.guard.is_busy()
    }

    /// Run one reconciliation pass unless another is in flight
    ///
    /// Every outcome is logged and, apart from coalescing, notified.
    pub async fn run_pass(&self) -> PassOutcome {
        let Some(_permit) = self.guard.try_begin() else {
            warn!("Previous reconciliation pass still in flight, coalescing trigger");
            return PassOutcome::Coalesced;
        };

        match self.execute_pass().await {
            Ok(report) => {
                if report.failed.is_empty() {
                    info!(
                        updated = report.updated.len(),
                        in_sync = report.in_sync.len(),
                        skipped = report.skipped.len(),
                        elapsed_ms = report.elapsed().num_milliseconds(),
                        "Reconciliation pass completed for {}",
                        report.public_ip
                    );
                } else {
                    warn!(
                        updated = report.updated.len(),
                        failed = report.failed.len(),
                        "Reconciliation pass completed with failures for {}",
                        report.public_ip
                    );
                }
                self.notify(&summary::pass_message(&report)).await;
                PassOutcome::Completed(report)
            }
            Err(e) => {
                if e.is_transient() {
                    error!("Reconciliation pass aborted, retrying on next trigger: {}", e);
                } else {
                    error!("Reconciliation pass aborted, operator action needed: {}", e);
                }
                self.notify(&summary::failure_message(&e)).await;
                PassOutcome::Aborted(e)
            }
        }
    }

    /// Resolve the public IP and report it through the sink
    ///
    /// Independent of reconciliation; patches nothing, so it does not take
    /// the pass slot.
    pub async fn report_ip(&self) -> Result<IpAddr> {
        match self.ip_source.resolve().await {
            Ok(ip) => {
                info!("Public IP is {}", ip);
                self.notify(&summary::ip_report_message(ip)).await;
                Ok(ip)
            }
            Err(e) => {
                error!("Public IP check failed: {}", e);
                self.notify(&summary::ip_report_failure_message(&e)).await;
                Err(e)
            }
        }
    }

    /// The pass itself, without guard or notification
    async fn execute_pass(&self) -> Result<PassReport> {
        let started_at = Utc::now();

        let public_ip = self.ip_source.resolve().await?;
        debug!("Resolved public IP {} via {}", public_ip, self.ip_source.source_name());

        let zones = self.provider.list_zones().await?;
        debug!(
            "{} zone(s) visible to the token on {}",
            zones.len(),
            self.provider.provider_name()
        );

        let assignment = diff::assign_zones(&self.records, &zones);
        let records_by_zone = self.fetch_records(&assignment).await?;
        let plan = diff::compute_updates(&assignment, &records_by_zone, public_ip);

        let (updated, failed) = if self.dry_run {
            (self.log_planned(&plan.tasks), Vec::new())
        } else {
            self.apply(&plan.tasks).await
        };

        Ok(PassReport {
            public_ip,
            started_at,
            finished_at: Utc::now(),
            updated,
            failed,
            in_sync: plan.in_sync,
            skipped: plan.skipped,
            dry_run: self.dry_run,
        })
    }

    /// List records of every relevant zone concurrently
    ///
    /// Fails fast: the first failing zone aborts the whole lookup.
    async fn fetch_records(
        &self,
        assignment: &ZoneAssignment,
    ) -> Result<HashMap<String, Vec<Record>>> {
        let zones = assignment.relevant_zones();

        let lookups = zones.iter().map(|zone| async move {
            let records = self
                .provider
                .list_records(&zone.id)
                .await
                .inspect_err(|e| {
                    warn!("Record lookup failed for zone {}: {}", zone.name, e);
                })?;
            debug!(
                "Zone {} has {} record(s) on {}",
                zone.name,
                records.len(),
                self.provider.provider_name()
            );
            Ok::<_, Error>((zone.id.clone(), records))
        });

        Ok(try_join_all(lookups).await?.into_iter().collect())
    }

    /// Issue every patch concurrently and collect each outcome
    async fn apply(&self, tasks: &[UpdateTask]) -> (Vec<String>, Vec<FailedPatch>) {
        let patches = tasks.iter().map(|task| async move {
            info!(
                "Updating {} -> {} (was: {})",
                task.record.name, task.new_content, task.record.content
            );
            let result = self
                .provider
                .patch_record(&task.zone.id, &task.record.id, &task.new_content)
                .await;
            (task, result)
        });

        let mut updated = Vec::new();
        let mut failed = Vec::new();
        for (task, result) in join_all(patches).await {
            match result {
                Ok(name) => {
                    info!("Updated {} -> {}", name, task.new_content);
                    updated.push(name);
                }
                Err(e) => {
                    error!("Failed to update {}: {}", task.record.name, e);
                    failed.push(FailedPatch {
                        record_name: task.record.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        (updated, failed)
    }

    fn log_planned(&self, tasks: &[UpdateTask]) -> Vec<String> {
        tasks
            .iter()
            .map(|task| {
                info!(
                    "[DRY-RUN] Would PATCH {} (zone {}, record {}) -> {} (was: {})",
                    task.record.name,
                    task.zone.id,
                    task.record.id,
                    task.new_content,
                    task.record.content
                );
                task.record.name.clone()
            })
            .collect()
    }

    /// Deliver a message; failures are logged, never propagated
    async fn notify(&self, message: &str) {
        if let Err(e) = self.sink.send(message).await {
            warn!(
                "Failed to deliver notification via {}: {}",
                self.sink.sink_name(),
                e
            );
        }
    }
}
