//! MongoDB source for dbvault.
//!
//! Documents are exported as relaxed Extended JSON, so ObjectIds and dates
//! keep their type (`{"$oid": ...}`, `{"$date": ...}`).

mod source;

pub use source::{MongoConnector, MongoSource, document_to_json};
