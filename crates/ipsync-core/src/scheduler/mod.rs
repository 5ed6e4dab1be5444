//! Periodic triggers for reconciliation and IP reports
//!
//! Two independent interval timers drive the [`Reconciler`]:
//!
//! - **reconcile**: runs [`Reconciler::run_pass`]
//! - **ip report**: runs [`Reconciler::report_ip`] (disabled when its interval is 0)
//!
//! Each tick spawns its work so a slow pass never delays the other timer.
//! Overlap between passes is prevented by the reconciler's pass guard: a tick
//! arriving while a pass is in flight is coalesced. Missed ticks are skipped,
//! not bursted.
//!
//! On shutdown the timers stop and in-flight work gets `drain_timeout_secs`
//! to finish before it is aborted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{debug, error, info, warn};

use crate::config::ScheduleConfig;
use crate::error::Result;
use crate::reconcile::Reconciler;

/// Drives a [`Reconciler`] on fixed intervals
pub struct Scheduler {
    reconciler: Arc<Reconciler>,
    schedule: ScheduleConfig,
}

impl Scheduler {
    /// Create a scheduler
    ///
    /// # Parameters
    ///
    /// - `reconciler`: Shared reconciler; other holders may trigger passes too
    /// - `schedule`: Timer settings
    pub fn new(reconciler: Arc<Reconciler>, schedule: ScheduleConfig) -> Result<Self> {
        schedule.validate()?;
        Ok(Self {
            reconciler,
            schedule,
        })
    }

    /// Run until `shutdown` resolves
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let mut reconcile_ticks = self.ticks(self.schedule.reconcile_interval_secs);
        let mut report_ticks = match self.schedule.ip_report_interval_secs {
            0 => None,
            secs => Some(self.ticks(secs)),
        };
        let mut in_flight: JoinSet<()> = JoinSet::new();

        info!(
            reconcile_interval_secs = self.schedule.reconcile_interval_secs,
            ip_report_interval_secs = self.schedule.ip_report_interval_secs,
            records = self.reconciler.records().len(),
            "Scheduler started"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                Some(_) = reconcile_ticks.next() => {
                    debug!("Reconcile timer fired");
                    let reconciler = Arc::clone(&self.reconciler);
                    in_flight.spawn(async move {
                        reconciler.run_pass().await;
                    });
                }

                Some(_) = next_tick(&mut report_ticks) => {
                    debug!("IP report timer fired");
                    let reconciler = Arc::clone(&self.reconciler);
                    in_flight.spawn(async move {
                        // Failure is already logged and notified
                        let _ = reconciler.report_ip().await;
                    });
                }

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!("Scheduled task failed: {}", e);
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.drain(in_flight).await;
        info!("Scheduler stopped");
        Ok(())
    }

    /// Interval stream firing every `secs`, first tick now or after one period
    fn ticks(&self, secs: u64) -> IntervalStream {
        let period = Duration::from_secs(secs);
        let start = if self.schedule.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + period
        };

        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        IntervalStream::new(interval)
    }

    /// Wait for in-flight work, aborting whatever outlives the drain timeout
    async fn drain(&self, mut in_flight: JoinSet<()>) {
        if in_flight.is_empty() {
            return;
        }

        let timeout = Duration::from_secs(self.schedule.drain_timeout_secs);
        info!("Waiting up to {:?} for {} in-flight task(s)", timeout, in_flight.len());

        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = in_flight.join_next().await {
                if let Err(e) = joined {
                    error!("Scheduled task failed: {}", e);
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Drain timeout elapsed, aborting {} task(s)", in_flight.len());
            in_flight.abort_all();
        }
    }
}

/// Next tick of an optional timer; a disabled timer never fires
async fn next_tick(ticks: &mut Option<IntervalStream>) -> Option<Instant> {
    match ticks {
        Some(ticks) => ticks.next().await,
        None => std::future::pending().await,
    }
}
