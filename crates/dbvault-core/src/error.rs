//! Backup pipeline errors.

use std::path::PathBuf;

use thiserror::Error;

use dbvault_protocols::{ArchiveError, SourceError};

use crate::run::RunStage;

/// Failure while streaming a single collection to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Cursor(#[from] SourceError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure that ends a backup run.
///
/// Every variant is caught at the orchestrator boundary; none reach the scheduler.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Workspace unavailable at {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot connect to database: {0}")]
    Connection(#[source] SourceError),

    #[error("Cannot list collections: {0}")]
    Enumeration(#[source] SourceError),

    #[error("Export of collection '{collection}' failed: {source}")]
    Export {
        collection: String,
        #[source]
        source: ExportError,
    },

    #[error("Archive failed: {0}")]
    Archive(#[from] ArchiveError),
}

impl BackupError {
    /// Pipeline stage the error came from.
    pub fn stage(&self) -> RunStage {
        match self {
            BackupError::Workspace { .. } => RunStage::Prepare,
            BackupError::Connection(_) => RunStage::Connect,
            BackupError::Enumeration(_) => RunStage::Enumerate,
            BackupError::Export { .. } => RunStage::Export,
            BackupError::Archive(_) => RunStage::Archive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_names_collection() {
        let err = BackupError::Export {
            collection: "orders".to_string(),
            source: ExportError::Cursor(SourceError::cursor("orders", "socket closed")),
        };
        let msg = err.to_string();
        assert!(msg.contains("orders"));
        assert!(msg.contains("socket closed"));
        assert_eq!(err.stage(), RunStage::Export);
    }

    #[test]
    fn test_stage_mapping() {
        let err = BackupError::Connection(SourceError::Connection("refused".into()));
        assert_eq!(err.stage(), RunStage::Connect);

        let err = BackupError::Enumeration(SourceError::Enumeration("denied".into()));
        assert_eq!(err.stage(), RunStage::Enumerate);

        let err = BackupError::from(ArchiveError::Io(std::io::Error::other("disk full")));
        assert_eq!(err.stage(), RunStage::Archive);

        let err = BackupError::Workspace {
            path: PathBuf::from("/tmp/ws"),
            source: std::io::Error::other("read-only"),
        };
        assert_eq!(err.stage(), RunStage::Prepare);
        assert!(err.to_string().contains("/tmp/ws"));
    }
}
