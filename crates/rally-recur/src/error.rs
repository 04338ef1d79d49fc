use rally_core::types::RepeatType;
use thiserror::Error;

/// Recurrence rule errors
#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Recurrence rule has no start date")]
    MissingStartDate,

    #[error("Unknown repeat type: {0}")]
    UnknownRepeatType(String),

    #[error("Repeat type '{0}' does not recur")]
    NotRecurring(RepeatType),

    #[error("Unknown lead time unit: {0}")]
    UnknownLeadTimeUnit(String),

    #[error("Lead time must not be negative, got {0}")]
    NegativeLeadTime(i32),

    #[error(transparent)]
    CoreError(#[from] rally_core::error::CoreError),
}

pub type RecurResult<T> = std::result::Result<T, RecurError>;
