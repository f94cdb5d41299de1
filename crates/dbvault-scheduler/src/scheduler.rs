//! Run scheduler: fires the backup job at startup and on every cron tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use dbvault_config::{OverlapPolicy, ScheduleConfig};
use dbvault_protocols::{FireReason, JobOutcome, ScheduledJob};

use crate::cron_trigger::CronTrigger;
use crate::error::SchedulerError;

/// Counters kept across the scheduler's lifetime.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    fired: AtomicU64,
    skipped: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl SchedulerStats {
    /// Fires received, including skipped ones.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    /// Fires dropped because a run was active.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn record(&self, outcome: &JobOutcome) {
        match outcome {
            JobOutcome::Succeeded { .. } => self.succeeded.fetch_add(1, Ordering::Relaxed),
            JobOutcome::Failed { .. } => self.failed.fetch_add(1, Ordering::Relaxed),
        };
    }
}

/// Fires a job on a cron schedule.
///
/// Each fire runs on its own task, so the timer keeps ticking while a long
/// run is in progress. Job failures are reported by the job itself and never
/// stop the schedule.
pub struct RunScheduler {
    job: Arc<dyn ScheduledJob>,
    trigger: CronTrigger,
    overlap: OverlapPolicy,
    run_on_start: bool,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    stats: Arc<SchedulerStats>,
}

impl RunScheduler {
    pub fn new(job: Arc<dyn ScheduledJob>, trigger: CronTrigger) -> Self {
        Self {
            job,
            trigger,
            overlap: OverlapPolicy::default(),
            run_on_start: true,
            permits: Arc::new(Semaphore::new(1)),
            tracker: TaskTracker::new(),
            stats: Arc::new(SchedulerStats::default()),
        }
    }

    /// Build from the `[schedule]` config section.
    pub fn from_config(
        job: Arc<dyn ScheduledJob>,
        config: &ScheduleConfig,
    ) -> Result<Self, SchedulerError> {
        let trigger = CronTrigger::from_config(config)?;
        Ok(Self::new(job, trigger)
            .with_overlap(config.overlap)
            .with_run_on_start(config.run_on_start))
    }

    pub fn with_overlap(mut self, overlap: OverlapPolicy) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn with_run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    pub fn trigger(&self) -> &CronTrigger {
        &self.trigger
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Runs currently executing or waiting for their turn.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Run the schedule until `cancel` changes, then wait for in-flight runs.
    pub async fn run(self: Arc<Self>, cancel: watch::Receiver<bool>) {
        info!(
            "Scheduler started for '{}' (cron: {}, overlap: {})",
            self.job.name(),
            self.trigger.expression(),
            self.overlap
        );

        if self.run_on_start {
            self.fire(FireReason::Startup);
        }

        let mut cancel = cancel;
        let mut last_fire: Option<DateTime<Utc>> = None;

        loop {
            let now = Utc::now();
            let from = last_fire.map_or(now, |last| last.max(now));
            let Some(next) = self.trigger.next_after(from) else {
                warn!(
                    "Cron expression '{}' has no upcoming fire time",
                    self.trigger.expression()
                );
                break;
            };
            let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!("Next '{}' fire at {}", self.job.name(), next.to_rfc3339());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    last_fire = Some(next);
                    self.fire(FireReason::Schedule { scheduled_at: next });
                }
                _ = cancel.changed() => {
                    info!("Scheduler shutting down");
                    break;
                }
            }
        }

        self.shutdown().await;
    }

    /// Stop accepting fires and wait for every started or queued run.
    pub async fn shutdown(&self) {
        self.tracker.close();
        if !self.tracker.is_empty() {
            info!("Waiting for {} in-flight run(s) to finish", self.tracker.len());
        }
        self.tracker.wait().await;
    }

    /// Fire the job once, subject to the overlap policy.
    ///
    /// Returns `false` when the fire was dropped.
    pub fn fire(&self, reason: FireReason) -> bool {
        self.stats.fired.fetch_add(1, Ordering::Relaxed);

        match self.overlap {
            OverlapPolicy::Overlap => {
                self.spawn_run(reason, None);
                true
            }
            OverlapPolicy::Skip => match self.permits.clone().try_acquire_owned() {
                Ok(permit) => {
                    self.spawn_run(reason, Some(permit));
                    true
                }
                Err(_) => {
                    self.stats.skipped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        "Skipping '{}' fire ({}): previous run still in progress",
                        self.job.name(),
                        reason
                    );
                    false
                }
            },
            OverlapPolicy::Queue => {
                let job = self.job.clone();
                let permits = self.permits.clone();
                let stats = self.stats.clone();
                self.tracker.spawn(async move {
                    match permits.acquire_owned().await {
                        Ok(permit) => execute(job, stats, reason, Some(permit)).await,
                        Err(e) => error!("Run queue closed: {}", e),
                    }
                });
                true
            }
        }
    }

    fn spawn_run(&self, reason: FireReason, permit: Option<OwnedSemaphorePermit>) {
        let job = self.job.clone();
        let stats = self.stats.clone();
        self.tracker.spawn(execute(job, stats, reason, permit));
    }
}

async fn execute(
    job: Arc<dyn ScheduledJob>,
    stats: Arc<SchedulerStats>,
    reason: FireReason,
    permit: Option<OwnedSemaphorePermit>,
) {
    debug!("Running '{}' ({})", job.name(), reason);
    let outcome = job.execute(reason).await;
    drop(permit);
    stats.record(&outcome);
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
