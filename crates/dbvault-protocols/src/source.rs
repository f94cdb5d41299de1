//! Database source protocol definitions.
//!
//! A source is the database being backed up. The pipeline only needs two
//! capabilities from it: enumerate collection names, and open a one-pass
//! stream over a collection's documents.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::error::SourceError;

/// A single self-describing record read from a collection.
pub type Document = serde_json::Value;

/// One-pass stream over the documents of a collection.
///
/// The stream is not restartable; a fresh one must be opened per attempt.
/// It ends with `None` on exhaustion or yields an `Err` on a cursor failure.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<Document, SourceError>> + Send>>;

/// Opens connections to a database.
///
/// A connection is made once per backup run, so a database that is briefly
/// unreachable fails that run only.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Returns the driver name (e.g. "mongodb", "sqlite").
    fn driver(&self) -> &str;

    /// Connect and return a handle to the configured database.
    async fn connect(&self) -> Result<Arc<dyn DocumentSource>, SourceError>;
}

/// Connected database handle.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Returns the logical database name.
    fn database(&self) -> &str;

    /// List all collection (or table) names, in the order the database reports them.
    async fn list_collections(&self) -> Result<Vec<String>, SourceError>;

    /// Open a sequential cursor over every document of a collection.
    async fn open_cursor(&self, collection: &str) -> Result<DocumentStream, SourceError>;
}
