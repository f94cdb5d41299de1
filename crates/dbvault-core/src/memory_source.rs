//! In-memory database source.
//!
//! Backs the pipeline tests. Collections keep insertion order,
//! and failures can be injected at connect, enumeration, or mid-cursor.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use parking_lot::RwLock;

use dbvault_protocols::{Document, DocumentSource, DocumentStream, SourceConnector, SourceError};

#[derive(Default)]
struct MemoryState {
    collections: Vec<(String, Vec<Document>)>,
    cursor_failures: HashMap<String, usize>,
    enumeration_failure: Option<String>,
}

/// In-memory collections with optional failure injection.
pub struct MemorySource {
    database: String,
    state: RwLock<MemoryState>,
    document_delay: Option<Duration>,
}

impl MemorySource {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            state: RwLock::new(MemoryState::default()),
            document_delay: None,
        }
    }

    /// Add (or replace) a collection.
    pub fn with_collection(self, name: impl Into<String>, documents: Vec<Document>) -> Self {
        self.insert_collection(name, documents);
        self
    }

    /// Make the cursor for `name` fail after yielding `after` documents.
    pub fn with_cursor_failure(self, name: impl Into<String>, after: usize) -> Self {
        self.state.write().cursor_failures.insert(name.into(), after);
        self
    }

    /// Make collection listing fail.
    pub fn with_enumeration_failure(self, message: impl Into<String>) -> Self {
        self.state.write().enumeration_failure = Some(message.into());
        self
    }

    /// Sleep before yielding each document, to simulate a slow cursor.
    pub fn with_document_delay(mut self, delay: Duration) -> Self {
        self.document_delay = Some(delay);
        self
    }

    pub fn insert_collection(&self, name: impl Into<String>, documents: Vec<Document>) {
        let name = name.into();
        let mut state = self.state.write();
        match state.collections.iter_mut().find(|(n, _)| *n == name) {
            Some((_, docs)) => *docs = documents,
            None => state.collections.push((name, documents)),
        }
    }

    pub fn remove_collection(&self, name: &str) {
        self.state.write().collections.retain(|(n, _)| n != name);
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        let mut state = self.state.write();
        state.cursor_failures.clear();
        state.enumeration_failure = None;
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    fn database(&self) -> &str {
        &self.database
    }

    async fn list_collections(&self) -> Result<Vec<String>, SourceError> {
        let state = self.state.read();
        if let Some(message) = &state.enumeration_failure {
            return Err(SourceError::Enumeration(message.clone()));
        }
        Ok(state.collections.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn open_cursor(&self, collection: &str) -> Result<DocumentStream, SourceError> {
        let (documents, fail_after) = {
            let state = self.state.read();
            let documents = state
                .collections
                .iter()
                .find(|(n, _)| n == collection)
                .map(|(_, docs)| docs.clone())
                .ok_or_else(|| SourceError::CollectionNotFound(collection.to_string()))?;
            (documents, state.cursor_failures.get(collection).copied())
        };

        let mut items: Vec<Result<Document, SourceError>> = match fail_after {
            Some(after) => documents.into_iter().take(after).map(Ok).collect(),
            None => documents.into_iter().map(Ok).collect(),
        };
        if fail_after.is_some() {
            items.push(Err(SourceError::cursor(collection, "injected cursor failure")));
        }

        let documents = stream::iter(items);
        match self.document_delay {
            Some(delay) => Ok(documents
                .then(move |item| async move {
                    tokio::time::sleep(delay).await;
                    item
                })
                .boxed()),
            None => Ok(documents.boxed()),
        }
    }
}

/// Connector handing out a shared [`MemorySource`].
pub struct MemoryConnector {
    source: Arc<MemorySource>,
    refusal: RwLock<Option<String>>,
    connects: AtomicU32,
}

impl MemoryConnector {
    pub fn new(source: Arc<MemorySource>) -> Self {
        Self {
            source,
            refusal: RwLock::new(None),
            connects: AtomicU32::new(0),
        }
    }

    /// Refuse every connection attempt with `message` (`None` to accept again).
    pub fn set_refusal(&self, message: Option<String>) {
        *self.refusal.write() = message;
    }

    /// Number of successful connections.
    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn source(&self) -> &Arc<MemorySource> {
        &self.source
    }
}

#[async_trait]
impl SourceConnector for MemoryConnector {
    fn driver(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> Result<Arc<dyn DocumentSource>, SourceError> {
        if let Some(message) = self.refusal.read().clone() {
            return Err(SourceError::Connection(message));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        let source: Arc<dyn DocumentSource> = self.source.clone();
        Ok(source)
    }
}
