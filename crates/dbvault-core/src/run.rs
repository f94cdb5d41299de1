//! Backup run record.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dbvault_protocols::{ArchiveSummary, FireReason};

use crate::error::BackupError;
use crate::streamer::ExportSummary;

/// Pipeline stage, used to report where a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Prepare,
    Connect,
    Enumerate,
    Export,
    Archive,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStage::Prepare => write!(f, "prepare"),
            RunStage::Connect => write!(f, "connect"),
            RunStage::Enumerate => write!(f, "enumerate"),
            RunStage::Export => write!(f, "export"),
            RunStage::Archive => write!(f, "archive"),
        }
    }
}

/// One exported collection file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFile {
    pub collection: String,
    pub path: PathBuf,
    pub documents: u64,
    pub bytes: u64,
}

impl From<ExportSummary> for CollectionFile {
    fn from(summary: ExportSummary) -> Self {
        Self {
            collection: summary.collection,
            path: summary.path,
            documents: summary.documents,
            bytes: summary.bytes,
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Still executing.
    Pending,
    Succeeded { archive: ArchiveSummary },
    Failed { stage: RunStage, error: String },
}

/// One execution of the backup pipeline.
///
/// Owned by the orchestrator while it runs and handed back to the caller
/// afterwards. Nothing here is persisted besides the archive and the log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRun {
    pub id: Uuid,
    pub reason: FireReason,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Collections discovered at enumeration time, in enumeration order.
    pub collections: Vec<String>,
    /// Files produced so far, in enumeration order.
    pub files: Vec<CollectionFile>,
    /// Set once the archive has been written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<PathBuf>,
    pub outcome: RunOutcome,
}

impl BackupRun {
    pub fn new(reason: FireReason, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reason,
            started_at,
            finished_at: None,
            collections: Vec::new(),
            files: Vec::new(),
            archive_path: None,
            outcome: RunOutcome::Pending,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, RunOutcome::Succeeded { .. })
    }

    /// Total documents across all exported collections.
    pub fn total_documents(&self) -> u64 {
        self.files.iter().map(|f| f.documents).sum()
    }

    /// Record the terminal state.
    pub fn finish(&mut self, result: Result<ArchiveSummary, BackupError>) {
        self.finished_at = Some(Utc::now());
        self.outcome = match result {
            Ok(archive) => {
                self.archive_path = Some(archive.path.clone());
                RunOutcome::Succeeded { archive }
            }
            Err(e) => RunOutcome::Failed {
                stage: e.stage(),
                error: e.to_string(),
            },
        };
    }
}
