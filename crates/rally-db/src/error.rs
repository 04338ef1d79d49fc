use diesel::result::DatabaseErrorKind;
use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    CoreError(#[from] rally_core::error::CoreError),
}

impl DbError {
    /// ## Summary
    /// Whether the failure is transient and the same call may succeed later.
    ///
    /// Pool exhaustion, dropped connections and serialization conflicts are
    /// retryable; constraint violations and query errors are not.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PoolError(_) | Self::Unavailable(_) => true,
            Self::DatabaseError(err) => matches!(
                err,
                diesel::result::Error::DatabaseError(
                    DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::SerializationFailure,
                    _
                ) | diesel::result::Error::BrokenTransactionManager
            ),
            Self::CoreError(_) => false,
        }
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
