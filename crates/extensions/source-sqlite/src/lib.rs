//! SQLite source for dbvault.
//!
//! Every user table is exported as a collection; each row becomes a JSON
//! object keyed by column name.

mod row;
mod source;

pub use source::{SqliteConnector, SqliteSource};
