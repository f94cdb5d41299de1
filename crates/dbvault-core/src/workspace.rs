//! Scratch directory for per-collection intermediate files.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

/// Result of a best-effort clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub removed: usize,
    pub failed: usize,
    /// Subdirectories, which are never descended into or removed.
    pub skipped: usize,
}

/// Owns the scratch directory that collection exports are written to.
///
/// Files are removed before and after every run. Clearing never fails:
/// entries that cannot be removed are logged at debug level and left behind.
/// Subdirectories are left alone.
#[derive(Debug, Clone)]
pub struct TempWorkspace {
    root: PathBuf,
}

impl TempWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory (and parents) if missing.
    pub async fn ensure(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Intermediate file paths for a run's collections, one per collection and
    /// in the same order.
    ///
    /// Names that collide after sanitizing (`a/b` and `a_b`) get a numeric
    /// suffix: `a_b.json`, `a_b-2.json`.
    pub fn files_for(&self, collections: &[String]) -> Vec<PathBuf> {
        let mut taken = HashSet::with_capacity(collections.len());
        collections
            .iter()
            .map(|collection| {
                let base = export_file_name(collection);
                let mut name = base.clone();
                let mut n = 2;
                while !taken.insert(name.clone()) {
                    name = format!("{}-{}.json", base.strip_suffix(".json").unwrap_or(&base), n);
                    n += 1;
                }
                self.root.join(name)
            })
            .collect()
    }

    /// List current entries, sorted by path.
    pub async fn entries(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            entries.push(entry.path());
        }
        entries.sort();
        Ok(entries)
    }

    /// Remove every file, ignoring per-entry failures.
    pub async fn clear(&self) -> ClearReport {
        let mut report = ClearReport::default();

        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return report,
            Err(e) => {
                warn!("Error clearing workspace {}: {}", self.root.display(), e);
                return report;
            }
        };

        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error clearing workspace {}: {}", self.root.display(), e);
                    break;
                }
            };

            let path = entry.path();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                debug!("Leaving directory {} in workspace", path.display());
                report.skipped += 1;
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    debug!("Could not remove {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }

        debug!(
            "Workspace {} cleared ({} removed, {} failed, {} skipped)",
            self.root.display(),
            report.removed,
            report.failed,
            report.skipped
        );
        report
    }
}

/// File name for a collection export: `<collection>.json`.
///
/// Path separators and NUL are replaced so a collection name can never
/// escape the workspace.
pub fn export_file_name(collection: &str) -> String {
    let mut name: String = collection
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if name.is_empty() || name == "." || name == ".." {
        name.insert(0, '_');
    }
    format!("{}.json", name)
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
