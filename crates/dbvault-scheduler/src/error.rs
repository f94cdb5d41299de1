//! Scheduler errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("Cron expression '{0}' has no upcoming fire time")]
    NoUpcomingFire(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cron_display() {
        let err = SchedulerError::InvalidCron {
            expression: "bogus".to_string(),
            reason: "unexpected token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid cron expression 'bogus': unexpected token"
        );
    }
}
