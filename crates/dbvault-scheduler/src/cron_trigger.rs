//! Cron-expression trigger.
//!
//! Computes fire times in UTC. Expressions use the six-field form
//! `second minute hour day_of_month month day_of_week`; classic five-field
//! expressions are accepted and get a `0` seconds field.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule;

use dbvault_config::{ScheduleConfig, normalize_cron};

use crate::error::SchedulerError;

/// Recurring fire times from a cron expression.
#[derive(Debug, Clone)]
pub struct CronTrigger {
    schedule: Schedule,
    expression: String,
}

impl CronTrigger {
    /// Parse a cron expression.
    ///
    /// Examples:
    /// - `"00 23 * * *"` - every day at 23:00
    /// - `"0 0 23 * * *"` - same, six-field form
    /// - `"0 30 4 * * MON-FRI"` - 04:30 on weekdays
    pub fn parse(expression: &str) -> Result<Self, SchedulerError> {
        let expression = normalize_cron(expression);
        let schedule =
            Schedule::from_str(&expression).map_err(|e| SchedulerError::InvalidCron {
                expression: expression.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            schedule,
            expression,
        })
    }

    /// Trigger for the `[schedule]` config section.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, SchedulerError> {
        Self::parse(&config.cron_expression())
    }

    /// Every day at `hour:minute` UTC.
    pub fn daily_at(hour: u32, minute: u32) -> Result<Self, SchedulerError> {
        Self::parse(&format!("0 {} {} * * *", minute, hour))
    }

    /// The normalized six-field expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// The next `count` fire times after `after`.
    pub fn upcoming_after(&self, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        self.schedule.after(&after).take(count).collect()
    }
}

#[cfg(test)]
#[path = "cron_trigger_tests.rs"]
mod tests;
