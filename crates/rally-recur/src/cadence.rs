//! Fixed step sizes for recurring events.

use chrono::{Datelike, Days, Months, NaiveDate};
use rally_core::types::RepeatType;
use serde::{Deserialize, Serialize};

use crate::error::RecurError;

/// The step between two consecutive occurrences of a recurring event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Cadence {
    /// Step length in days, or `None` for calendar-month steps.
    #[must_use]
    pub const fn step_days(self) -> Option<u64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            Self::Monthly => None,
        }
    }

    /// ## Summary
    /// Hard limit on the number of candidates examined in one expansion.
    ///
    /// Each cap covers roughly a year (daily) to ten years (monthly) of
    /// occurrences, far more than any lookahead or display window needs.
    #[must_use]
    pub const fn iteration_cap(self) -> u32 {
        match self {
            Self::Daily => 366,
            Self::Weekly => 260,
            Self::Biweekly => 130,
            Self::Monthly => 120,
        }
    }

    /// ## Summary
    /// Returns the `n`-th occurrence counted from `anchor` (`n = 0` is the anchor).
    ///
    /// Monthly steps are always taken from the anchor, never from the previous
    /// occurrence. A day-of-month missing from the target month is clamped to
    /// that month's last day, and later months return to the anchor day.
    ///
    /// Returns `None` when the result falls outside the supported date range.
    #[must_use]
    pub fn nth(self, anchor: NaiveDate, n: u32) -> Option<NaiveDate> {
        match self.step_days() {
            Some(step) => anchor.checked_add_days(Days::new(step.checked_mul(u64::from(n))?)),
            None => anchor.checked_add_months(Months::new(n)),
        }
    }

    /// ## Summary
    /// Index of the first occurrence on or after `date`.
    ///
    /// Computed directly instead of stepping a cursor, so the fast-forward to a
    /// far-away window costs the same as a near one.
    #[must_use]
    pub fn first_index_on_or_after(self, anchor: NaiveDate, date: NaiveDate) -> Option<u32> {
        if date <= anchor {
            return Some(0);
        }

        match self.step_days() {
            Some(step) => {
                let days = u64::try_from((date - anchor).num_days()).ok()?;
                u32::try_from(days.div_ceil(step)).ok()
            }
            None => {
                let years = date.year() - anchor.year();
                let months = i64::from(years) * 12 + i64::from(date.month())
                    - i64::from(anchor.month());
                let mut index = u32::try_from(months).ok()?;
                // Clamping can land the same-month occurrence before `date`
                if self.nth(anchor, index)? < date {
                    index = index.checked_add(1)?;
                }
                Some(index)
            }
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.repeat_type().as_str()
    }

    #[must_use]
    pub const fn repeat_type(self) -> RepeatType {
        match self {
            Self::Daily => RepeatType::Daily,
            Self::Weekly => RepeatType::Weekly,
            Self::Biweekly => RepeatType::Biweekly,
            Self::Monthly => RepeatType::Monthly,
        }
    }
}

impl TryFrom<RepeatType> for Cadence {
    type Error = RecurError;

    fn try_from(repeat_type: RepeatType) -> Result<Self, Self::Error> {
        match repeat_type {
            RepeatType::None => Err(RecurError::NotRecurring(repeat_type)),
            RepeatType::Daily => Ok(Self::Daily),
            RepeatType::Weekly => Ok(Self::Weekly),
            RepeatType::Biweekly => Ok(Self::Biweekly),
            RepeatType::Monthly => Ok(Self::Monthly),
        }
    }
}

impl From<Cadence> for RepeatType {
    fn from(cadence: Cadence) -> Self {
        cadence.repeat_type()
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
