//! Archive codec protocol definitions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;

/// Writes a batch of already-materialized files into one archive.
///
/// Implementations are synchronous; callers run them on a blocking thread.
pub trait ArchiveCodec: Send + Sync {
    /// File extension of produced archives, without the leading dot.
    fn extension(&self) -> &str;

    /// Write `files` as one archive at `destination`, replacing any existing file.
    fn write_archive(
        &self,
        files: &[PathBuf],
        destination: &Path,
    ) -> Result<ArchiveSummary, ArchiveError>;
}

/// Result of a finalized archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    /// Where the archive was written.
    pub path: PathBuf,
    /// Entry names, in insertion order.
    pub entries: Vec<String>,
    /// Size of the archive on disk.
    pub bytes: u64,
}
