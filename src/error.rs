//! Error types for typetable store operations

use thiserror::Error;

/// Errors that can occur while binding, loading or saving records
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing input, detected before any I/O
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An identifier resolved to more than one stored row
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether this error came from the backing store (connectivity, statement
    /// execution or payload decoding)
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Sql(_) | Self::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = StoreError::invalid_input("TenantContext.tenant_id cannot be blank");
        assert!(err.is_invalid_input());
        assert!(!err.is_storage());
        assert_eq!(
            err.to_string(),
            "Invalid input: TenantContext.tenant_id cannot be blank"
        );
    }

    #[test]
    fn test_conflict_category() {
        let err = StoreError::conflict("duplicate");
        assert!(err.is_conflict());
        assert!(!err.is_invalid_input());
        assert!(!err.is_storage());
    }

    #[test]
    fn test_storage_categories() {
        assert!(StoreError::connection("refused").is_storage());
        assert!(StoreError::from(sqlx::Error::RowNotFound).is_storage());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(StoreError::from(json_err).is_storage());
    }
}
