//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Supported database drivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDriver {
    #[default]
    Mongodb,
    Sqlite,
}

impl std::fmt::Display for SourceDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceDriver::Mongodb => write!(f, "mongodb"),
            SourceDriver::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Database connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub driver: SourceDriver,

    /// Connection string (MongoDB URI, or SQLite file path).
    #[serde(default)]
    pub uri: String,

    /// Logical database to export.
    #[serde(default)]
    pub name: String,

    /// Cursor batch size hint passed to the driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory receiving dated archives.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Scratch directory for per-collection intermediate files.
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Append-only completion log.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            workspace_dir: default_workspace_dir(),
            log_file: default_log_file(),
        }
    }
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("backup_log.txt")
}

/// What to do when a trigger fires while a run is still in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Start a second run concurrently. Both runs share the workspace.
    Overlap,
    /// Drop the fire and log it.
    #[default]
    Skip,
    /// Wait for the active run, then start.
    Queue,
}

impl std::fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlapPolicy::Overlap => write!(f, "overlap"),
            OverlapPolicy::Skip => write!(f, "skip"),
            OverlapPolicy::Queue => write!(f, "queue"),
        }
    }
}

/// Recurring trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Explicit cron expression. Overrides `hour`/`minute` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,

    /// Daily fire hour (UTC).
    #[serde(default = "default_hour")]
    pub hour: u32,

    /// Daily fire minute.
    #[serde(default)]
    pub minute: u32,

    /// Run once immediately at process start.
    #[serde(default = "default_true")]
    pub run_on_start: bool,

    #[serde(default)]
    pub overlap: OverlapPolicy,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cron: None,
            hour: default_hour(),
            minute: 0,
            run_on_start: true,
            overlap: OverlapPolicy::default(),
        }
    }
}

impl ScheduleConfig {
    /// The effective six-field cron expression (`sec min hour dom month dow`).
    ///
    /// Five-field expressions get a leading `0` seconds field.
    pub fn cron_expression(&self) -> String {
        match &self.cron {
            Some(expr) => normalize_cron(expr),
            None => format!("0 {} {} * * *", self.minute, self.hour),
        }
    }
}

/// Convert classic five-field cron into the six-field form with seconds.
pub fn normalize_cron(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        fields.join(" ")
    }
}

fn default_hour() -> u32 {
    23
}

fn default_true() -> bool {
    true
}

/// Which calendar the archive date is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateBasis {
    #[default]
    Utc,
    Local,
}

/// Backup pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default = "default_archive_extension")]
    pub archive_extension: String,

    #[serde(default)]
    pub date_basis: DateBasis,

    /// Collections streamed at once. 1 streams sequentially.
    #[serde(default = "default_export_concurrency")]
    pub export_concurrency: usize,

    /// Also append failed runs to the completion log.
    #[serde(default = "default_true")]
    pub log_failures: bool,

    /// Deflate level (0-9). Codec default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i64>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            archive_extension: default_archive_extension(),
            date_basis: DateBasis::default(),
            export_concurrency: default_export_concurrency(),
            log_failures: true,
            compression_level: None,
        }
    }
}

fn default_archive_extension() -> String {
    "zip".to_string()
}

fn default_export_concurrency() -> usize {
    1
}

/// Diagnostic logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines on the console.
    #[serde(default)]
    pub json: bool,

    /// Directory for daily-rolling diagnostic files. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Daemon process settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid_file: Option<PathBuf>,
}

impl DaemonConfig {
    /// PID file path, defaulting to `~/.dbvault/dbvault.pid`.
    pub fn pid_file(&self) -> PathBuf {
        self.pid_file.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".dbvault").join("dbvault.pid"))
                .unwrap_or_else(|| PathBuf::from("/tmp/dbvault.pid"))
        })
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
