//! MongoDB connector and source.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{Bson, Document as BsonDocument, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::debug;

use dbvault_protocols::{Document, DocumentSource, DocumentStream, SourceConnector, SourceError};

/// Connects to MongoDB once per run.
pub struct MongoConnector {
    uri: String,
    database: String,
    batch_size: Option<u32>,
}

impl MongoConnector {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            batch_size: None,
        }
    }

    /// Cursor batch size sent with every `find`.
    pub fn with_batch_size(mut self, batch_size: Option<u32>) -> Self {
        self.batch_size = batch_size;
        self
    }
}

#[async_trait]
impl SourceConnector for MongoConnector {
    fn driver(&self) -> &str {
        "mongodb"
    }

    async fn connect(&self) -> Result<Arc<dyn DocumentSource>, SourceError> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;
        options.app_name = Some("dbvault".to_string());

        let client =
            Client::with_options(options).map_err(|e| SourceError::Connection(e.to_string()))?;
        let db = client.database(&self.database);

        // The driver connects lazily; ping so an unreachable server fails here.
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        debug!("Connected to MongoDB database '{}'", self.database);
        Ok(Arc::new(MongoSource {
            client,
            db,
            batch_size: self.batch_size,
        }))
    }
}

/// Connected MongoDB database.
///
/// The client is closed when the last handle is dropped at the end of the run.
pub struct MongoSource {
    client: Client,
    db: Database,
    batch_size: Option<u32>,
}

impl MongoSource {
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    fn database(&self) -> &str {
        self.db.name()
    }

    async fn list_collections(&self) -> Result<Vec<String>, SourceError> {
        self.db
            .list_collection_names()
            .await
            .map_err(|e| SourceError::Enumeration(e.to_string()))
    }

    async fn open_cursor(&self, collection: &str) -> Result<DocumentStream, SourceError> {
        let coll = self.db.collection::<BsonDocument>(collection);
        let mut find = coll.find(doc! {});
        if let Some(size) = self.batch_size {
            find = find.batch_size(size);
        }
        let cursor = find
            .await
            .map_err(|e| SourceError::cursor(collection, e))?;

        let name = collection.to_string();
        Ok(cursor
            .map_ok(document_to_json)
            .map_err(move |e| SourceError::cursor(name.as_str(), e))
            .boxed())
    }
}

/// Render a BSON document as relaxed Extended JSON.
pub fn document_to_json(document: BsonDocument) -> Document {
    Bson::Document(document).into_relaxed_extjson()
}
