//! Edits to a recurring event's schedule.
//!
//! Both edits only shrink the set of occurrences. Invitations already
//! materialized for removed dates are kept and hidden on read.

use chrono::NaiveDate;
use rally_db::model::event::Event;
use rally_db::store::EventStore;
use rally_recur::RecurrenceRule;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Cancels the single occurrence on `date`.
///
/// ## Errors
/// - `ServiceError::NotFound` if the event does not exist.
/// - `ServiceError::ValidationError` if `date` is not an occurrence.
/// - `ServiceError::RecurError` if the event is not a valid recurring event.
pub async fn cancel_occurrence<S>(store: &S, event_id: Uuid, date: NaiveDate) -> ServiceResult<Event>
where
    S: EventStore + ?Sized,
{
    let rule = load_rule(store, event_id).await?;
    if !rule.is_occurrence(date) {
        return Err(ServiceError::ValidationError(format!(
            "{date} is not an occurrence of event {event_id}"
        )));
    }
    save_rule(store, event_id, &rule.excluding(date)).await
}

/// ## Summary
/// Ends the series so that `date` and every later occurrence are removed.
///
/// ## Errors
/// - `ServiceError::NotFound` if the event does not exist.
/// - `ServiceError::RecurError` if the event is not a valid recurring event.
pub async fn end_series<S>(store: &S, event_id: Uuid, date: NaiveDate) -> ServiceResult<Event>
where
    S: EventStore + ?Sized,
{
    let rule = load_rule(store, event_id).await?;
    save_rule(store, event_id, &rule.ending_before(date)).await
}

async fn load_rule<S>(store: &S, event_id: Uuid) -> ServiceResult<RecurrenceRule>
where
    S: EventStore + ?Sized,
{
    let event = store
        .event(event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))?;
    Ok(event.recurrence_rule()?)
}

#[tracing::instrument(skip(store, rule), fields(end = ?rule.end_date(), excluded = rule.excluded_dates().len()))]
async fn save_rule<S>(store: &S, event_id: Uuid, rule: &RecurrenceRule) -> ServiceResult<Event>
where
    S: EventStore + ?Sized,
{
    store
        .update_schedule(
            event_id,
            rule.end_date(),
            rule.excluded_dates().iter().copied().collect(),
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))
}
