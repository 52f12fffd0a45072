//! Error types for liteorm

use rusqlite::ffi;
use thiserror::Error;

/// Result type alias for liteorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum OrmError {
    /// Query execution error reported by the engine
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// Row not found (raised only by the `*_or_fail` family)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique or primary-key constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// NOT NULL constraint violation
    #[error("Not-null constraint violation: {0}")]
    NotNullViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// The operation needs metadata that was never configured (e.g. a primary key)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Builder state cannot be rendered into valid SQL
    #[error("Render error: {0}")]
    Render(String),

    /// Transaction bracket misuse
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is any kind of constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation(_)
                | Self::NotNullViolation(_)
                | Self::ForeignKeyViolation(_)
                | Self::CheckViolation(_)
        )
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Parse a rusqlite error into a more specific OrmError
    pub fn from_db_error(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                let message = message
                    .clone()
                    .unwrap_or_else(|| failure.to_string());

                match failure.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Self::UniqueViolation(message);
                    }
                    ffi::SQLITE_CONSTRAINT_NOTNULL => return Self::NotNullViolation(message),
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        return Self::ForeignKeyViolation(message);
                    }
                    ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(message),
                    _ => {}
                }
            }
        }
        Self::Query(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint_failure(extended_code: i32, message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code,
            },
            Some(message.to_string()),
        )
    }

    #[test]
    fn maps_unique_violation() {
        let err = OrmError::from_db_error(constraint_failure(
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: users.email",
        ));
        assert!(err.is_unique_violation());
        assert!(err.is_constraint_violation());
        assert!(err.to_string().contains("users.email"));
    }

    #[test]
    fn maps_primary_key_as_unique() {
        let err = OrmError::from_db_error(constraint_failure(
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
            "UNIQUE constraint failed: users.id",
        ));
        assert!(err.is_unique_violation());
    }

    #[test]
    fn maps_not_null_violation() {
        let err = OrmError::from_db_error(constraint_failure(
            ffi::SQLITE_CONSTRAINT_NOTNULL,
            "NOT NULL constraint failed: users.name",
        ));
        assert!(matches!(err, OrmError::NotNullViolation(_)));
    }

    #[test]
    fn other_errors_pass_through() {
        let err = OrmError::from_db_error(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, OrmError::Query(_)));
        assert!(!err.is_constraint_violation());
    }
}
