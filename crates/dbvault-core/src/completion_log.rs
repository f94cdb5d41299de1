//! Append-only run outcome log.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Persistent `[<timestamp>] <message>` log, one line per run outcome.
///
/// The file is opened for each append and closed again; it is never read,
/// truncated or rotated.
#[derive(Debug, Clone)]
pub struct CompletionLog {
    path: PathBuf,
}

impl CompletionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` stamped with the current time.
    pub async fn append(&self, message: &str) -> std::io::Result<()> {
        self.append_at(Utc::now(), message).await
    }

    /// Append `message` stamped with `at`.
    pub async fn append_at(&self, at: DateTime<Utc>, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format_line(at, message).as_bytes()).await?;
        file.flush().await
    }
}

/// `[2024-03-07T23:00:00.000Z] message\n`, with embedded newlines flattened.
pub fn format_line(at: DateTime<Utc>, message: &str) -> String {
    let flat = message.replace(['\r', '\n'], " ");
    format!(
        "[{}] {}\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        flat
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_format_line_iso_millis() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 23, 0, 5).unwrap();
        assert_eq!(
            format_line(at, "Backup completed successfully."),
            "[2024-03-07T23:00:05.000Z] Backup completed successfully.\n"
        );
    }

    #[test]
    fn test_format_line_flattens_newlines() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 0, 0, 0).unwrap();
        let line = format_line(at, "first\nsecond\r\nthird");
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains("first second  third"));
    }

    #[tokio::test]
    async fn test_append_creates_parent_and_appends() {
        let dir = TempDir::new().unwrap();
        let log = CompletionLog::new(dir.path().join("logs").join("backup_log.txt"));

        let at = Utc.with_ymd_and_hms(2024, 3, 7, 23, 0, 0).unwrap();
        log.append_at(at, "one").await.unwrap();
        log.append_at(at, "two").await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            content,
            "[2024-03-07T23:00:00.000Z] one\n[2024-03-07T23:00:00.000Z] two\n"
        );
    }

    #[tokio::test]
    async fn test_append_preserves_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup_log.txt");
        std::fs::write(&path, "existing\n").unwrap();

        CompletionLog::new(&path).append("new").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("existing\n["));
        assert!(content.ends_with("] new\n"));
    }
}
