use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] rally_db::error::DbError),

    #[error(transparent)]
    RecurError(#[from] rally_recur::RecurError),

    #[error(transparent)]
    CoreError(#[from] rally_core::error::CoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ServiceError {
    /// Whether the underlying store failure is transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DatabaseError(err) if err.is_retryable())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
