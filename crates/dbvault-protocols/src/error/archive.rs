//! Archive codec errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot add '{}' to archive: {reason}", .path.display())]
    AddFile { path: PathBuf, reason: String },

    #[error("Failed to finalize archive '{}': {reason}", .path.display())]
    Finalize { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_error_display() {
        let err = ArchiveError::Finalize {
            path: PathBuf::from("/backups/2024-03-07.zip"),
            reason: "disk full".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("2024-03-07.zip"));
        assert!(display.contains("disk full"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ArchiveError::from(io_err);
        assert!(err.to_string().contains("denied"));
    }
}
