//! SQLite connector and source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::OpenFlags;
use tokio::sync::mpsc;
use tokio_rusqlite::Connection;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use dbvault_protocols::{Document, DocumentSource, DocumentStream, SourceConnector, SourceError};

use crate::row::{quote_ident, row_to_document};

/// Rows buffered between the SQLite thread and the exporter.
const DEFAULT_ROW_BUFFER: usize = 256;

/// Opens a SQLite database file read-only, once per run.
pub struct SqliteConnector {
    path: PathBuf,
    name: String,
    row_buffer: usize,
}

impl SqliteConnector {
    /// `name` labels the database in logs; the file stem is used when empty.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let path = path.into();
        let mut name = name.into();
        if name.is_empty() {
            name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "sqlite".to_string());
        }
        Self {
            path,
            name,
            row_buffer: DEFAULT_ROW_BUFFER,
        }
    }

    /// Rows read ahead of the exporter (`database.batch_size`).
    pub fn with_row_buffer(mut self, rows: usize) -> Self {
        self.row_buffer = rows.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SourceConnector for SqliteConnector {
    fn driver(&self) -> &str {
        "sqlite"
    }

    async fn connect(&self) -> Result<Arc<dyn DocumentSource>, SourceError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)
            .await
            .map_err(|e| {
                SourceError::Connection(format!("{}: {}", self.path.display(), e))
            })?;

        // Opening is lazy; make sure the file really is a database.
        conn.call(|conn| {
            conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
                row.get::<_, i64>(0)
            })?;
            Ok(())
        })
        .await
        .map_err(|e| SourceError::Connection(format!("{}: {}", self.path.display(), e)))?;

        debug!("Opened SQLite database {}", self.path.display());
        Ok(Arc::new(SqliteSource {
            conn,
            database: self.name.clone(),
            row_buffer: self.row_buffer,
        }))
    }
}

/// Connected SQLite database.
pub struct SqliteSource {
    conn: Connection,
    database: String,
    row_buffer: usize,
}

#[async_trait]
impl DocumentSource for SqliteSource {
    fn database(&self) -> &str {
        &self.database
    }

    async fn list_collections(&self) -> Result<Vec<String>, SourceError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                     ORDER BY rowid",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(|e| SourceError::Enumeration(e.to_string()))
    }

    async fn open_cursor(&self, collection: &str) -> Result<DocumentStream, SourceError> {
        let table = collection.to_string();
        let exists = self
            .conn
            .call({
                let table = table.clone();
                move |conn| {
                    let found = conn.query_row(
                        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                        [&table],
                        |row| row.get::<_, i64>(0),
                    )?;
                    Ok(found > 0)
                }
            })
            .await
            .map_err(|e| SourceError::cursor(collection, e.to_string()))?;
        if !exists {
            return Err(SourceError::CollectionNotFound(table));
        }

        let (tx, rx) = mpsc::channel::<Result<Document, SourceError>>(self.row_buffer);
        let conn = self.conn.clone();

        tokio::spawn(async move {
            let row_tx = tx.clone();
            let query_table = table.clone();
            let result = conn
                .call(move |conn| {
                    let mut stmt =
                        conn.prepare(&format!("SELECT * FROM {}", quote_ident(&query_table)))?;
                    let columns: Vec<String> =
                        stmt.column_names().into_iter().map(String::from).collect();
                    let mut rows = stmt.query([])?;
                    while let Some(row) = rows.next()? {
                        let document = row_to_document(row, &columns)?;
                        // Receiver gone: the export was abandoned.
                        if row_tx.blocking_send(Ok(document)).is_err() {
                            break;
                        }
                    }
                    Ok(())
                })
                .await;

            if let Err(e) = result {
                let _ = tx.send(Err(SourceError::cursor(&table, e.to_string()))).await;
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
