// # ipsync-core
//
// Core library for the ipsync scheduled dynamic-DNS reconciler.
//
// ## Architecture Overview
//
// This library provides the reconciliation logic and its collaborator seams:
// - **IpSource**: Trait for resolving the current public IP
// - **DnsProvider**: Trait for listing zones/records and patching records
// - **NotificationSink**: Trait for the best-effort summary side channel
// - **Reconciler**: One pass of resolve-IP → fetch-state → diff → patch → notify
// - **Scheduler**: Periodic triggers for passes and IP reports
//
// ## Design Principles
//
// 1. **Stateless passes**: Nothing survives a pass; each one re-fetches everything
// 2. **Injected collaborators**: HTTP clients and configuration are passed in
// 3. **Never create**: Only existing records are patched
// 4. **No overlap**: One pass at a time; extra triggers are coalesced
// 5. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod model;
pub mod reconcile;
pub mod scheduler;
pub mod notify;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, NotificationSink};
pub use model::{Zone, Record, UpdateTask, PassReport, FailedPatch, SkipReason};
pub use reconcile::{Reconciler, PassOutcome, PassGuard};
pub use scheduler::Scheduler;
pub use notify::NoopSink;
pub use config::{SyncConfig, ProviderConfig, IpSourceConfig, NotificationConfig, ScheduleConfig, ReconcileConfig};
pub use error::{Error, Result};
