//! Backup orchestrator: drives one run of the pipeline end to end.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use futures::{StreamExt, TryStreamExt, stream};
use tracing::{debug, error, info};

use dbvault_config::{Config, DateBasis};
use dbvault_protocols::{
    ArchiveCodec, ArchiveError, ArchiveSummary, DocumentSource, FireReason, JobOutcome,
    ScheduledJob, SourceConnector,
};

use crate::completion_log::CompletionLog;
use crate::error::BackupError;
use crate::run::{BackupRun, CollectionFile, RunOutcome};
use crate::streamer::{CollectionStreamer, ExportSummary};
use crate::workspace::TempWorkspace;

/// Settings the orchestrator needs from the configuration.
#[derive(Debug, Clone)]
pub struct BackupSettings {
    pub backup_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub log_file: PathBuf,
    pub date_basis: DateBasis,
    pub export_concurrency: usize,
    pub log_failures: bool,
}

impl BackupSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            backup_dir: config.paths.backup_dir.clone(),
            workspace_dir: config.paths.workspace_dir.clone(),
            log_file: config.paths.log_file.clone(),
            date_basis: config.backup.date_basis,
            export_concurrency: config.backup.export_concurrency,
            log_failures: config.backup.log_failures,
        }
    }
}

/// Runs the backup pipeline.
///
/// Steps, strictly in order: clear workspace, connect and list collections,
/// stream every collection, write the dated archive, clear workspace, log the
/// outcome. Any failure ends the run; nothing is propagated to the caller.
pub struct BackupOrchestrator {
    connector: Arc<dyn SourceConnector>,
    codec: Arc<dyn ArchiveCodec>,
    workspace: TempWorkspace,
    streamer: CollectionStreamer,
    log: CompletionLog,
    settings: BackupSettings,
}

impl BackupOrchestrator {
    pub fn new(
        connector: Arc<dyn SourceConnector>,
        codec: Arc<dyn ArchiveCodec>,
        settings: BackupSettings,
    ) -> Self {
        Self {
            connector,
            codec,
            workspace: TempWorkspace::new(settings.workspace_dir.clone()),
            streamer: CollectionStreamer::new(),
            log: CompletionLog::new(settings.log_file.clone()),
            settings,
        }
    }

    /// Replace the default streamer (e.g. to tune its buffer).
    pub fn with_streamer(mut self, streamer: CollectionStreamer) -> Self {
        self.streamer = streamer;
        self
    }

    pub fn workspace(&self) -> &TempWorkspace {
        &self.workspace
    }

    pub fn settings(&self) -> &BackupSettings {
        &self.settings
    }

    /// Create the backup and workspace directories.
    pub async fn prepare_directories(&self) -> Result<(), BackupError> {
        for dir in [&self.settings.backup_dir, &self.settings.workspace_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| BackupError::Workspace {
                    path: dir.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Archive path for a run starting at `started_at`.
    pub fn archive_path(&self, started_at: DateTime<Utc>) -> PathBuf {
        let date = archive_date(started_at, self.settings.date_basis);
        self.settings.backup_dir.join(format!(
            "{}.{}",
            date.format("%Y-%m-%d"),
            self.codec.extension()
        ))
    }

    /// Run a backup starting now.
    pub async fn run_backup(&self, reason: FireReason) -> BackupRun {
        self.run_backup_at(reason, Utc::now()).await
    }

    /// Run a backup whose start time (and so archive date) is `started_at`.
    pub async fn run_backup_at(&self, reason: FireReason, started_at: DateTime<Utc>) -> BackupRun {
        let mut run = BackupRun::new(reason, started_at);
        info!("Backup run {} started ({})", run.id, run.reason);

        self.workspace.clear().await;
        let result = self.run_pipeline(&mut run).await;
        self.workspace.clear().await;

        run.finish(result);
        self.record_outcome(&run).await;
        run
    }

    async fn run_pipeline(&self, run: &mut BackupRun) -> Result<ArchiveSummary, BackupError> {
        self.prepare_directories().await?;

        let source = self
            .connector
            .connect()
            .await
            .map_err(BackupError::Connection)?;

        let collections = source
            .list_collections()
            .await
            .map_err(BackupError::Enumeration)?;
        info!(
            "Found {} collections in '{}'",
            collections.len(),
            source.database()
        );
        run.collections = collections.clone();

        let exported = self.export_all(source.as_ref(), &collections).await?;
        let files: Vec<PathBuf> = exported.iter().map(|e| e.path.clone()).collect();
        run.files = exported.into_iter().map(CollectionFile::from).collect();

        let destination = self.archive_path(run.started_at);
        let codec = self.codec.clone();
        let archive = tokio::task::spawn_blocking(move || codec.write_archive(&files, &destination))
            .await
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e.to_string())))??;

        Ok(archive)
    }

    /// Stream every collection, at most `export_concurrency` at a time.
    ///
    /// Results keep enumeration order. The first failure aborts the remaining
    /// exports.
    async fn export_all(
        &self,
        source: &dyn DocumentSource,
        collections: &[String],
    ) -> Result<Vec<ExportSummary>, BackupError> {
        let limit = self.settings.export_concurrency.max(1);

        let exports: Vec<_> = collections
            .iter()
            .zip(self.workspace.files_for(collections))
            .map(|(collection, destination)| self.export_one(source, collection, destination))
            .collect();

        stream::iter(exports).buffered(limit).try_collect().await
    }

    async fn export_one(
        &self,
        source: &dyn DocumentSource,
        collection: &str,
        destination: PathBuf,
    ) -> Result<ExportSummary, BackupError> {
        debug!("Exporting '{}' to {}", collection, destination.display());

        self.streamer
            .export(source, collection, &destination)
            .await
            .map_err(|source| BackupError::Export {
                collection: collection.to_string(),
                source,
            })
    }

    async fn record_outcome(&self, run: &BackupRun) {
        match &run.outcome {
            RunOutcome::Succeeded { archive } => {
                info!(
                    "Backup run {} completed: {} collections, {} documents, {} bytes -> {}",
                    run.id,
                    run.files.len(),
                    run.total_documents(),
                    archive.bytes,
                    archive.path.display()
                );
                let message = format!(
                    "Backup completed successfully. ZIP saved to: {}",
                    archive.path.display()
                );
                if let Err(e) = self.log.append(&message).await {
                    error!(
                        "Failed to append to completion log {}: {}",
                        self.log.path().display(),
                        e
                    );
                }
            }
            RunOutcome::Failed { stage, error } => {
                error!("Error during backup run {} ({}): {}", run.id, stage, error);
                if self.settings.log_failures {
                    let message = format!("Backup failed: {}", error);
                    if let Err(e) = self.log.append(&message).await {
                        error!(
                            "Failed to append to completion log {}: {}",
                            self.log.path().display(),
                            e
                        );
                    }
                }
            }
            RunOutcome::Pending => {}
        }
    }
}

/// Calendar date naming the archive of a run that started at `started_at`.
pub fn archive_date(started_at: DateTime<Utc>, basis: DateBasis) -> NaiveDate {
    match basis {
        DateBasis::Utc => started_at.date_naive(),
        DateBasis::Local => started_at.with_timezone(&Local).date_naive(),
    }
}

#[async_trait]
impl ScheduledJob for BackupOrchestrator {
    fn name(&self) -> &str {
        "backup"
    }

    async fn execute(&self, reason: FireReason) -> JobOutcome {
        let run = self.run_backup(reason).await;
        match run.outcome {
            RunOutcome::Succeeded { archive } => JobOutcome::Succeeded {
                summary: archive.path.display().to_string(),
            },
            RunOutcome::Failed { stage, error } => JobOutcome::Failed {
                error: format!("{}: {}", stage, error),
            },
            RunOutcome::Pending => JobOutcome::Failed {
                error: "run did not finish".to_string(),
            },
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
