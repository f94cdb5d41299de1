//! ZIP archive construction.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use dbvault_protocols::{ArchiveCodec, ArchiveError, ArchiveSummary};

/// Entries at or above this size need ZIP64 headers.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// Accumulates files and writes them as one ZIP archive.
///
/// Each file becomes an entry named after its file name. Files are streamed
/// from disk into the archive, so they must be fully written before
/// [`finalize`](Self::finalize) is called.
#[derive(Debug, Clone, Default)]
pub struct ZipArchiveBuilder {
    files: Vec<PathBuf>,
    compression_level: Option<i64>,
}

impl ZipArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflate level (0-9); `None` keeps the codec default.
    pub fn compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }

    /// Queue a file for the archive.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.files.push(path.into());
        self
    }

    /// Entry names in insertion order.
    pub fn entries(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    /// Write all queued files to `destination`.
    ///
    /// The archive is assembled in a `.partial` sibling and renamed into place,
    /// so an existing archive is only replaced by a complete one.
    pub fn finalize(&self, destination: &Path) -> Result<ArchiveSummary, ArchiveError> {
        let partial = partial_path(destination);

        let result = self
            .write_entries(&partial)
            .and_then(|entries| {
                fs::rename(&partial, destination).map_err(|e| ArchiveError::Finalize {
                    path: destination.to_path_buf(),
                    reason: e.to_string(),
                })?;
                Ok(entries)
            });

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                if let Err(rm) = fs::remove_file(&partial) {
                    if rm.kind() != io::ErrorKind::NotFound {
                        warn!("Could not remove {}: {}", partial.display(), rm);
                    }
                }
                return Err(e);
            }
        };

        let bytes = fs::metadata(destination)?.len();
        debug!(
            "Archive {} written ({} entries, {} bytes)",
            destination.display(),
            entries.len(),
            bytes
        );

        Ok(ArchiveSummary {
            path: destination.to_path_buf(),
            entries,
            bytes,
        })
    }

    fn write_entries(&self, target: &Path) -> Result<Vec<String>, ArchiveError> {
        let finalize_err = |reason: String| ArchiveError::Finalize {
            path: target.to_path_buf(),
            reason,
        };

        let file = File::create(target).map_err(|e| finalize_err(e.to_string()))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let mut entries = Vec::with_capacity(self.files.len());

        for path in &self.files {
            let add_err = |reason: String| ArchiveError::AddFile {
                path: path.clone(),
                reason,
            };

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| add_err("path has no file name".to_string()))?;
            let source = File::open(path).map_err(|e| add_err(e.to_string()))?;
            let size = source.metadata().map_err(|e| add_err(e.to_string()))?.len();

            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(self.compression_level)
                .large_file(size >= ZIP64_THRESHOLD);

            zip.start_file(name.as_str(), options)
                .map_err(|e| add_err(e.to_string()))?;
            io::copy(&mut BufReader::new(source), &mut zip).map_err(|e| add_err(e.to_string()))?;
            entries.push(name);
        }

        let writer = zip.finish().map_err(|e| finalize_err(e.to_string()))?;
        let file = writer
            .into_inner()
            .map_err(|e| finalize_err(e.error().to_string()))?;
        file.sync_all().map_err(|e| finalize_err(e.to_string()))?;

        Ok(entries)
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    destination.with_file_name(name)
}

/// [`ArchiveCodec`] producing ZIP files.
#[derive(Debug, Clone)]
pub struct ZipCodec {
    extension: String,
    compression_level: Option<i64>,
}

impl ZipCodec {
    pub fn new() -> Self {
        Self {
            extension: "zip".to_string(),
            compression_level: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }
}

impl Default for ZipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveCodec for ZipCodec {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn write_archive(
        &self,
        files: &[PathBuf],
        destination: &Path,
    ) -> Result<ArchiveSummary, ArchiveError> {
        let mut builder = ZipArchiveBuilder::new().compression_level(self.compression_level);
        for file in files {
            builder.add_file(file);
        }
        builder.finalize(destination)
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
