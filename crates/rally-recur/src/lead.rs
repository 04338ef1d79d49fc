//! Invitation lead times.
//!
//! A recurring event may hold back each occurrence's invitation until a fixed
//! amount of time before the occurrence starts.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rally_core::constants::DEFAULT_OCCURRENCE_HOUR;
use rally_core::types::LeadTimeUnit;
use serde::{Deserialize, Serialize};

use crate::error::{RecurError, RecurResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTime {
    pub value: u32,
    pub unit: LeadTimeUnit,
}

impl LeadTime {
    #[must_use]
    pub const fn new(value: u32, unit: LeadTimeUnit) -> Self {
        Self { value, unit }
    }

    /// ## Summary
    /// Builds a lead time from the nullable columns of a stored event.
    ///
    /// A missing or zero value, or a missing unit, means invitations go out
    /// as soon as they are materialized.
    ///
    /// ## Errors
    /// - `RecurError::NegativeLeadTime` if `value` is below zero.
    /// - `RecurError::UnknownLeadTimeUnit` if `unit` is not a known value.
    pub fn from_parts(value: Option<i32>, unit: Option<&str>) -> RecurResult<Option<Self>> {
        let (Some(value), Some(raw)) = (value, unit) else {
            return Ok(None);
        };
        let value = u32::try_from(value).map_err(|_| RecurError::NegativeLeadTime(value))?;
        if value == 0 {
            return Ok(None);
        }
        let unit = raw
            .parse::<LeadTimeUnit>()
            .map_err(|_| RecurError::UnknownLeadTimeUnit(raw.to_owned()))?;
        Ok(Some(Self::new(value, unit)))
    }

    /// The lead time as a duration, if representable.
    #[must_use]
    pub fn as_delta(self) -> Option<TimeDelta> {
        let value = i64::from(self.value);
        match self.unit {
            LeadTimeUnit::Hours => TimeDelta::try_hours(value),
            LeadTimeUnit::Days => TimeDelta::try_days(value),
            LeadTimeUnit::Weeks => TimeDelta::try_weeks(value),
        }
    }

    /// ## Summary
    /// When the invitation for the occurrence on `date` is sent.
    ///
    /// Occurrences without a start time are taken to start at noon. Returns
    /// `None` only when the result falls outside the supported date range.
    #[must_use]
    pub fn send_at(self, date: NaiveDate, start_time: Option<NaiveTime>) -> Option<NaiveDateTime> {
        occurrence_start(date, start_time).checked_sub_signed(self.as_delta()?)
    }
}

/// The moment an occurrence on `date` begins.
#[must_use]
pub fn occurrence_start(date: NaiveDate, start_time: Option<NaiveTime>) -> NaiveDateTime {
    let time = start_time
        .or_else(|| NaiveTime::from_hms_opt(DEFAULT_OCCURRENCE_HOUR, 0, 0))
        .unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

/// ## Summary
/// Whether the invitation for an occurrence has gone out by `now`.
///
/// Without a lead time every materialized invitation counts as sent.
#[must_use]
pub fn is_sent(
    lead_time: Option<LeadTime>,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    now: NaiveDateTime,
) -> bool {
    lead_time
        .and_then(|lead| lead.send_at(date, start_time))
        .is_none_or(|send_at| send_at <= now)
}
