//! Scheduled job protocol definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a job was fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FireReason {
    /// Immediate run at process start.
    Startup,
    /// Recurring trigger reached its scheduled time.
    Schedule { scheduled_at: DateTime<Utc> },
    /// Explicit one-off request (CLI).
    Manual,
}

impl std::fmt::Display for FireReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FireReason::Startup => write!(f, "startup"),
            FireReason::Schedule { scheduled_at } => {
                write!(f, "schedule@{}", scheduled_at.to_rfc3339())
            }
            FireReason::Manual => write!(f, "manual"),
        }
    }
}

/// Terminal result of one job execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded { summary: String },
    Failed { error: String },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded { .. })
    }
}

/// A long-running unit of work fired by the scheduler.
///
/// `execute` never returns an error: failures are handled inside the job and
/// reported through the outcome.
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Job name for logs.
    fn name(&self) -> &str;

    /// Run the job to completion.
    async fn execute(&self, reason: FireReason) -> JobOutcome;
}
