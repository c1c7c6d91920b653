//! Storage layer error types
//!
//! Defines all errors that can occur while talking to the event store.

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// The store could not be reached, or a statement against it failed
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A write violated a schema constraint (e.g. unknown bin or location)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Requested registry entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    /// Persisted row could not be decoded
    #[error("Corrupt data: {0}")]
    Corruption(String),

    /// I/O operation failed (data directory creation)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn location_not_found(id: i64) -> Self {
        StorageError::NotFound {
            kind: "Location",
            id,
        }
    }

    pub fn bin_not_found(id: i64) -> Self {
        StorageError::NotFound { kind: "Bin", id }
    }

    /// Whether this error means the store itself is unreachable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::Unavailable(_) | StorageError::Io(_))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, _) = &err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                return StorageError::Constraint(err.to_string());
            }
        }
        StorageError::Unavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        StorageError::Unavailable(format!("storage task failed: {}", err))
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::bin_not_found(7);
        assert_eq!(err.to_string(), "Bin not found: 7");

        let err = StorageError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Storage unavailable: connection refused");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let storage_err: StorageError = io_err.into();
        assert!(matches!(storage_err, StorageError::Io(_)));
        assert!(storage_err.is_unavailable());
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
