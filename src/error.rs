use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFoundError(String),
    #[error("Conflict: {0}")]
    ConflictError(String),
    #[error("Invalid transition: {0}")]
    InvalidTransitionError(String),
    #[error("Storage error: {reason}")]
    StorageError { reason: String, transient: bool },
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub fn storage(reason: impl Into<String>) -> Self {
        Self::StorageError {
            reason: reason.into(),
            transient: false,
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        Self::StorageError {
            reason: reason.into(),
            transient: true,
        }
    }

    /// Only transient storage failures may be retried; everything else is a
    /// caller mistake or a fatal backend condition.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::StorageError {
                transient: true,
                ..
            }
        )
    }

    /// Stable identifier for mapping onto an API surface.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::ValidationError(_) => "VALIDATION_ERROR",
            LedgerError::NotFoundError(_) => "NOT_FOUND",
            LedgerError::ConflictError(_) => "CONFLICT",
            LedgerError::InvalidTransitionError(_) => "INVALID_TRANSITION",
            LedgerError::StorageError { .. } => "STORAGE_ERROR",
            LedgerError::CsvError(_) => "CSV_ERROR",
            LedgerError::IoError(_) => "IO_ERROR",
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::storage(format!("Serialization error: {}", err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(err: rocksdb::Error) -> Self {
        use rocksdb::ErrorKind;
        let transient = matches!(
            err.kind(),
            ErrorKind::Busy | ErrorKind::TimedOut | ErrorKind::TryAgain | ErrorKind::Incomplete
        );
        LedgerError::StorageError {
            reason: err.into_string(),
            transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_storage_errors_are_retryable() {
        assert!(LedgerError::transient("timeout").is_retryable());
        assert!(!LedgerError::storage("disk full").is_retryable());
        assert!(!LedgerError::ValidationError("bad".into()).is_retryable());
        assert!(!LedgerError::InvalidTransitionError("done".into()).is_retryable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::NotFoundError("x".into()).code(),
            "NOT_FOUND"
        );
        assert_eq!(LedgerError::ConflictError("x".into()).code(), "CONFLICT");
        assert_eq!(LedgerError::transient("x").code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_storage_error_display() {
        let err = LedgerError::storage("column family missing");
        assert_eq!(err.to_string(), "Storage error: column family missing");
    }
}
