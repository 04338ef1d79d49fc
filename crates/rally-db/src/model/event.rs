use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use diesel::{pg::Pg, prelude::*};
use rally_core::types::RepeatType;
use rally_recur::{LeadTime, RecurError, RecurResult, RecurrenceRule};
use uuid::Uuid;

use crate::db::schema;

/// A club event row.
///
/// `repeat_type` is kept as raw text; it is parsed per row so that one
/// unknown value only invalidates that event.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, serde::Serialize)]
#[diesel(table_name = schema::events)]
#[diesel(check_for_backend(Pg))]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub repeat_type: Option<String>,
    pub repeat_end_date: Option<NaiveDate>,
    pub excluded_dates: Vec<NaiveDate>,
    pub target_subgroup_ids: Vec<Uuid>,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub invitation_lead_time_value: Option<i32>,
    pub invitation_lead_time_unit: Option<String>,
}

impl Event {
    /// ## Summary
    /// Parses the stored repeat type. A missing value is a one-off event.
    ///
    /// ## Errors
    /// Returns `RecurError::UnknownRepeatType` for unrecognized values.
    pub fn parsed_repeat_type(&self) -> RecurResult<RepeatType> {
        match self.repeat_type.as_deref() {
            None => Ok(RepeatType::None),
            Some(raw) => raw
                .parse()
                .map_err(|_| RecurError::UnknownRepeatType(raw.to_owned())),
        }
    }

    /// ## Summary
    /// Whether the row asks to repeat.
    ///
    /// Unknown repeat types count as recurring so they reach rule validation
    /// and get reported instead of silently shown as one-off events.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        !matches!(self.parsed_repeat_type(), Ok(RepeatType::None))
    }

    /// ## Summary
    /// Builds the recurrence rule stored on this row.
    ///
    /// ## Errors
    /// Returns a `RecurError` if the row is not a valid recurring event.
    pub fn recurrence_rule(&self) -> RecurResult<RecurrenceRule> {
        RecurrenceRule::from_parts(
            self.start_date,
            self.repeat_type.as_deref(),
            self.repeat_end_date,
            &self.excluded_dates,
        )
    }

    /// ## Summary
    /// The lead time stored on this row, if any.
    ///
    /// ## Errors
    /// Returns a `RecurError` if the stored value is negative or the unit is unknown.
    pub fn lead_time(&self) -> RecurResult<Option<LeadTime>> {
        LeadTime::from_parts(
            self.invitation_lead_time_value,
            self.invitation_lead_time_unit.as_deref(),
        )
    }

    /// ## Summary
    /// When the invitation for the occurrence on `date` goes out, or `None`
    /// if it goes out as soon as it is materialized.
    ///
    /// ## Errors
    /// Returns a `RecurError` if the stored lead time is invalid.
    pub fn invitation_send_at(&self, date: NaiveDate) -> RecurResult<Option<NaiveDateTime>> {
        Ok(self
            .lead_time()?
            .and_then(|lead| lead.send_at(date, self.start_time)))
    }

    /// The subgroup whose colour the calendar shows for this event.
    #[must_use]
    pub fn primary_subgroup(&self) -> Option<Uuid> {
        self.target_subgroup_ids.first().copied()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::events)]
pub struct NewEvent {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub repeat_type: Option<String>,
    pub repeat_end_date: Option<NaiveDate>,
    pub excluded_dates: Vec<NaiveDate>,
    pub target_subgroup_ids: Vec<Uuid>,
    pub cancelled: bool,
    pub invitation_lead_time_value: Option<i32>,
    pub invitation_lead_time_unit: Option<String>,
}

impl NewEvent {
    /// A one-off event on `date`.
    #[must_use]
    pub fn single(club_id: Uuid, title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::now_v7(),
            club_id,
            title: title.into(),
            description: None,
            start_date: Some(date),
            start_time: None,
            end_time: None,
            location: None,
            repeat_type: None,
            repeat_end_date: None,
            excluded_dates: Vec::new(),
            target_subgroup_ids: Vec::new(),
            cancelled: false,
            invitation_lead_time_value: None,
            invitation_lead_time_unit: None,
        }
    }

    /// An event starting on `start` and repeating per `repeat_type`.
    #[must_use]
    pub fn recurring(
        club_id: Uuid,
        title: impl Into<String>,
        start: NaiveDate,
        repeat_type: RepeatType,
    ) -> Self {
        Self {
            repeat_type: Some(repeat_type.as_str().to_owned()),
            ..Self::single(club_id, title, start)
        }
    }

    #[must_use]
    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.repeat_end_date = Some(end);
        self
    }

    #[must_use]
    pub fn with_excluded_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.excluded_dates.extend(dates);
        self
    }

    #[must_use]
    pub fn with_subgroups(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.target_subgroup_ids.extend(ids);
        self
    }

    #[must_use]
    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Holds each occurrence's invitation back until `lead` before it starts.
    #[must_use]
    pub fn with_lead_time(mut self, lead: LeadTime) -> Self {
        self.invitation_lead_time_value = i32::try_from(lead.value).ok();
        self.invitation_lead_time_unit = Some(lead.unit.as_str().to_owned());
        self
    }

    #[must_use]
    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    /// Materializes the row as the database would return it.
    #[must_use]
    pub fn into_event(self, created_at: DateTime<Utc>) -> Event {
        Event {
            id: self.id,
            club_id: self.club_id,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            repeat_type: self.repeat_type,
            repeat_end_date: self.repeat_end_date,
            excluded_dates: self.excluded_dates,
            target_subgroup_ids: self.target_subgroup_ids,
            cancelled: self.cancelled,
            created_at,
            invitation_lead_time_value: self.invitation_lead_time_value,
            invitation_lead_time_unit: self.invitation_lead_time_unit,
        }
    }
}
