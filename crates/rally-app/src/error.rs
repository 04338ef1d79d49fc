use thiserror::Error;

/// Worker-level errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] rally_service::error::ServiceError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
