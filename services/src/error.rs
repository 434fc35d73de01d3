use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failure taxonomy shared by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed input, or a reference outside the caller's scope.
    #[error("{0}")]
    Validation(String),
    /// An active attendance mark already occupies the slot, or a unique column clashed.
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// The caller's role does not allow the operation.
    #[error("{0}")]
    Forbidden(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Stable machine-readable kind, surfaced to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Database(_) => "internal",
        }
    }
}

/// Converts a failed write into a domain error.
///
/// Unique violations become `Conflict` with `context` prefixed to the storage
/// message; foreign-key violations become `Validation`.
pub fn classify_write_err(err: DbErr, context: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            ServiceError::Conflict(format!("{context} ({detail})"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            ServiceError::Validation(format!("Referenced row does not exist ({detail})"))
        }
        _ => ServiceError::Database(err),
    }
}
