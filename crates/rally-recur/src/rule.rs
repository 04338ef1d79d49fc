use std::collections::BTreeSet;

use chrono::NaiveDate;
use rally_core::types::RepeatType;
use serde::{Deserialize, Serialize};

use crate::cadence::Cadence;
use crate::error::{RecurError, RecurResult};

/// The schedule of a recurring event.
///
/// Rules are immutable values; edits such as cancelling one occurrence or
/// ending the series produce a new rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    start_date: NaiveDate,
    cadence: Cadence,
    end_date: Option<NaiveDate>,
    excluded_dates: BTreeSet<NaiveDate>,
}

impl RecurrenceRule {
    #[must_use]
    pub const fn new(start_date: NaiveDate, cadence: Cadence) -> Self {
        Self {
            start_date,
            cadence,
            end_date: None,
            excluded_dates: BTreeSet::new(),
        }
    }

    /// Sets the inclusive last date on which an occurrence may fall.
    #[must_use]
    pub fn with_end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.end_date = end_date;
        self
    }

    #[must_use]
    pub fn with_excluded_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.excluded_dates.extend(dates);
        self
    }

    /// ## Summary
    /// Builds a rule from the loosely-typed columns of a stored event.
    ///
    /// ## Errors
    /// - `RecurError::UnknownRepeatType` if `repeat_type` is not a known value.
    /// - `RecurError::NotRecurring` if the event is a one-off.
    /// - `RecurError::MissingStartDate` if a recurring event has no start date.
    pub fn from_parts(
        start_date: Option<NaiveDate>,
        repeat_type: Option<&str>,
        end_date: Option<NaiveDate>,
        excluded_dates: &[NaiveDate],
    ) -> RecurResult<Self> {
        let repeat_type = match repeat_type {
            Some(raw) => raw
                .parse::<RepeatType>()
                .map_err(|_| RecurError::UnknownRepeatType(raw.to_owned()))?,
            None => RepeatType::None,
        };
        let cadence = Cadence::try_from(repeat_type)?;
        let start_date = start_date.ok_or(RecurError::MissingStartDate)?;

        Ok(Self::new(start_date, cadence)
            .with_end_date(end_date)
            .with_excluded_dates(excluded_dates.iter().copied()))
    }

    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    #[must_use]
    pub const fn excluded_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.excluded_dates
    }

    #[must_use]
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.excluded_dates.contains(&date)
    }

    /// Whether `date` is on or before the rule's end date (always true when open-ended).
    #[must_use]
    pub fn within_end(&self, date: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| date <= end)
    }

    /// The `n`-th candidate date, before exclusions and the end date apply.
    #[must_use]
    pub fn nth(&self, n: u32) -> Option<NaiveDate> {
        self.cadence.nth(self.start_date, n)
    }

    #[must_use]
    pub fn first_index_on_or_after(&self, date: NaiveDate) -> Option<u32> {
        self.cadence.first_index_on_or_after(self.start_date, date)
    }

    /// ## Summary
    /// Whether an occurrence of this rule falls on `date`.
    ///
    /// Excluded dates and dates past the end date are not occurrences.
    #[must_use]
    pub fn is_occurrence(&self, date: NaiveDate) -> bool {
        date >= self.start_date
            && self.within_end(date)
            && !self.is_excluded(date)
            && self
                .first_index_on_or_after(date)
                .and_then(|index| self.nth(index))
                == Some(date)
    }

    /// Returns a copy of this rule with one more cancelled date.
    #[must_use]
    pub fn excluding(&self, date: NaiveDate) -> Self {
        let mut rule = self.clone();
        rule.excluded_dates.insert(date);
        rule
    }

    /// ## Summary
    /// Returns a copy of this rule that ends on the day before `date`.
    ///
    /// An existing earlier end date is kept. Ending on or before the start date
    /// yields a rule with no occurrences.
    #[must_use]
    pub fn ending_before(&self, date: NaiveDate) -> Self {
        let cutoff = date.pred_opt().unwrap_or(NaiveDate::MIN);
        let mut rule = self.clone();
        rule.end_date = Some(self.end_date.map_or(cutoff, |end| end.min(cutoff)));
        rule
    }
}
