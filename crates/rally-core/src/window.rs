//! Inclusive calendar-date ranges.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// An inclusive `[start, end]` range of timezone-naive calendar dates.
///
/// Construction guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// ## Summary
    /// Creates a window covering `start..=end`.
    ///
    /// ## Errors
    /// Returns `CoreError::InvertedWindow` if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// A window of a single day.
    #[must_use]
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// ## Summary
    /// The lookahead window used for invitations: `today` through `weeks` weeks ahead.
    ///
    /// Saturates at the end of the supported date range.
    #[must_use]
    pub fn lookahead(today: NaiveDate, weeks: u32) -> Self {
        let end = today
            .checked_add_days(Days::new(u64::from(weeks) * 7))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }

    /// ## Summary
    /// The display window for a calendar month.
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidInput` if the year/month pair is not a valid date.
    pub fn month(year: i32, month: u32) -> CoreResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CoreError::InvalidInput(format!("invalid month {year}-{month}")))?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(|| CoreError::InvalidInput(format!("invalid month {year}-{month}")))?;
        Ok(Self { start, end })
    }

    /// The window for the month containing `date`.
    #[must_use]
    pub fn month_of(date: NaiveDate) -> Self {
        Self::month(date.year(), date.month()).unwrap_or_else(|_| Self::day(date))
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
