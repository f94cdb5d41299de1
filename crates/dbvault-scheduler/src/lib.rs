//! # dbvault Scheduler
//!
//! Fires a [`ScheduledJob`](dbvault_protocols::ScheduledJob) once at startup
//! and then on every cron fire time, applying the configured
//! [`OverlapPolicy`](dbvault_config::OverlapPolicy) when a run is still active.

pub mod cron_trigger;
pub mod error;
pub mod scheduler;

pub use cron_trigger::CronTrigger;
pub use error::SchedulerError;
pub use scheduler::{RunScheduler, SchedulerStats};
