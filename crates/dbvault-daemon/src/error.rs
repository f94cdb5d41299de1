//! Daemon errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    /// Another live process holds the lock.
    #[error("dbvault already running (PID file: {}, PID: {pid})", .path.display())]
    AlreadyRunning { path: PathBuf, pid: u32 },

    #[error("Failed to create PID file at {}: {reason}", .path.display())]
    LockCreation { path: PathBuf, reason: String },

    #[error("Failed to read PID file at {}: {reason}", .path.display())]
    LockRead { path: PathBuf, reason: String },

    #[error("Failed to remove PID file at {}: {reason}", .path.display())]
    LockRemoval { path: PathBuf, reason: String },

    #[error("Failed to set up signal handlers: {0}")]
    SignalSetup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_running_error() {
        let err = DaemonError::AlreadyRunning {
            path: PathBuf::from("/run/dbvault.pid"),
            pid: 4242,
        };
        let msg = err.to_string();
        assert!(msg.contains("already running"));
        assert!(msg.contains("/run/dbvault.pid"));
        assert!(msg.contains("4242"));
    }

    #[test]
    fn test_lock_read_error() {
        let err = DaemonError::LockRead {
            path: PathBuf::from("/run/dbvault.pid"),
            reason: "Invalid PID".to_string(),
        };
        assert!(err.to_string().contains("Invalid PID"));
    }
}
