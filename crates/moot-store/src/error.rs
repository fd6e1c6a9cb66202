//! Error types for the storage layer.

use moot_types::ErrorKind;
use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying sled database failed.
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An insert-only write found a document already present.
    #[error("document {key} already exists in {collection}")]
    Duplicate {
        /// Collection (tree) name.
        collection: String,
        /// Printable form of the key.
        key: String,
    },
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Duplicate { .. } => ErrorKind::Conflict,
            StoreError::Database(_) | StoreError::Serialization(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display() {
        let err = StoreError::Duplicate {
            collection: "accounts".to_string(),
            key: "alice".to_string(),
        };
        assert!(err.to_string().contains("accounts"));
        assert!(err.to_string().contains("alice"));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_serialization_is_internal() {
        let err: StoreError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
