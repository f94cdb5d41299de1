//! Database source errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to enumerate collections: {0}")]
    Enumeration(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Cursor error on '{collection}': {message}")]
    Cursor { collection: String, message: String },
}

impl SourceError {
    /// Build a cursor error for a collection.
    pub fn cursor(collection: impl Into<String>, message: impl ToString) -> Self {
        Self::Cursor {
            collection: collection.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error() {
        let err = SourceError::Connection("connection refused".to_string());
        let display = err.to_string();
        assert!(display.contains("Connection error"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn test_cursor_error_names_collection() {
        let err = SourceError::cursor("orders", "socket closed");
        let display = err.to_string();
        assert!(display.contains("orders"));
        assert!(display.contains("socket closed"));
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<SourceError> = vec![
            SourceError::Connection("a".to_string()),
            SourceError::Enumeration("b".to_string()),
            SourceError::CollectionNotFound("c".to_string()),
            SourceError::cursor("d", "e"),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
