use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date window: {start} is after {end}")]
    InvertedWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
