//! Streams one collection into a JSON array file.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use dbvault_protocols::{Document, DocumentSource};

use crate::error::ExportError;

/// Default output buffer size.
const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Result of a completed export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub collection: String,
    pub path: PathBuf,
    pub documents: u64,
    pub bytes: u64,
}

/// Writes a collection to disk as `[doc,doc,...]` one document at a time.
///
/// Memory use is bounded by the current document plus the output buffer,
/// independent of collection size.
#[derive(Debug, Clone)]
pub struct CollectionStreamer {
    buffer_capacity: usize,
}

impl CollectionStreamer {
    pub fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Set the output buffer size.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    /// Export `collection` from `source` into `destination`.
    ///
    /// The destination is truncated and `[` is written before the cursor is
    /// opened. On a cursor error the handle is closed without the closing `]`,
    /// leaving an invalid file behind, and the error is returned.
    pub async fn export(
        &self,
        source: &dyn DocumentSource,
        collection: &str,
        destination: &Path,
    ) -> Result<ExportSummary, ExportError> {
        let mut export = CollectionExport::create(destination, self.buffer_capacity).await?;

        let mut documents = match source.open_cursor(collection).await {
            Ok(stream) => stream,
            Err(e) => {
                export.abandon().await;
                return Err(e.into());
            }
        };

        while let Some(next) = documents.next().await {
            let pushed = match next {
                Ok(document) => export.push(&document).await,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = pushed {
                debug!(
                    "Export of '{}' aborted after {} documents: {}",
                    collection, export.documents, e
                );
                export.abandon().await;
                return Err(e);
            }
        }

        let (documents, bytes) = export.finish().await?;
        debug!(
            "Exported '{}' ({} documents, {} bytes) to {}",
            collection,
            documents,
            bytes,
            destination.display()
        );

        Ok(ExportSummary {
            collection: collection.to_string(),
            path: destination.to_path_buf(),
            documents,
            bytes,
        })
    }
}

impl Default for CollectionStreamer {
    fn default() -> Self {
        Self::new()
    }
}

/// In-flight state of one export.
struct CollectionExport {
    writer: BufWriter<File>,
    first: bool,
    documents: u64,
    bytes: u64,
    scratch: Vec<u8>,
}

impl CollectionExport {
    async fn create(path: &Path, capacity: usize) -> std::io::Result<Self> {
        let file = File::create(path).await?;
        let mut export = Self {
            writer: BufWriter::with_capacity(capacity, file),
            first: true,
            documents: 0,
            bytes: 0,
            scratch: Vec::new(),
        };
        export.write(b"[").await?;
        Ok(export)
    }

    async fn push(&mut self, document: &Document) -> Result<(), ExportError> {
        self.scratch.clear();
        if !self.first {
            self.scratch.push(b',');
        }
        serde_json::to_writer(&mut self.scratch, document)?;

        let chunk = std::mem::take(&mut self.scratch);
        let written = self.write(&chunk).await;
        self.scratch = chunk;
        written?;

        self.first = false;
        self.documents += 1;
        Ok(())
    }

    async fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.bytes += bytes.len() as u64;
        Ok(())
    }

    /// Close the array, flush and close the file.
    async fn finish(mut self) -> std::io::Result<(u64, u64)> {
        self.write(b"]").await?;
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok((self.documents, self.bytes))
    }

    /// Close without the closing bracket.
    async fn abandon(mut self) {
        let _ = self.writer.flush().await;
        let _ = self.writer.shutdown().await;
    }
}

#[cfg(test)]
#[path = "streamer_tests.rs"]
mod tests;
