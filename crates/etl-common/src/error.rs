//! Error types for the listings ETL.

use thiserror::Error;

/// Result type alias using EtlError.
pub type EtlResult<T> = Result<T, EtlError>;

/// Primary error type for ETL operations.
#[derive(Debug, Error)]
pub enum EtlError {
    // === Input Errors ===
    #[error("Required artifact not found: {0}")]
    MissingArtifact(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Failed to read or write CSV: {0}")]
    Csv(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Warehouse already contains rows ({0}); rerun with truncation to reload")]
    WarehouseNotEmpty(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EtlError {
    /// Short category label used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            EtlError::MissingArtifact(_) => "missing_precondition",
            EtlError::MissingColumn(_) | EtlError::Csv(_) => "schema",
            EtlError::InvalidConfig(_) => "config",
            EtlError::StorageError(_) | EtlError::DatabaseError(_) => "connectivity",
            EtlError::WarehouseNotEmpty(_) => "warehouse_state",
            EtlError::InternalError(_) => "internal",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EtlError::InvalidConfig(_) => 2,
            EtlError::MissingArtifact(_)
            | EtlError::MissingColumn(_)
            | EtlError::Csv(_) => 3,
            EtlError::StorageError(_) | EtlError::DatabaseError(_) => 4,
            EtlError::WarehouseNotEmpty(_) => 5,
            EtlError::InternalError(_) => 1,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::InternalError(err.to_string())
    }
}

impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        EtlError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        EtlError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_errors_share_category() {
        assert_eq!(EtlError::StorageError("x".into()).category(), "connectivity");
        assert_eq!(EtlError::DatabaseError("x".into()).category(), "connectivity");
        assert_eq!(EtlError::DatabaseError("x".into()).exit_code(), 4);
    }

    #[test]
    fn test_io_error_conversion() {
        let err: EtlError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, EtlError::InternalError(_)));
        assert!(err.to_string().contains("boom"));
    }
}
