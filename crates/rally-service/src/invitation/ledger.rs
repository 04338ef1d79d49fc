use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rally_core::types::InvitationStatus;
use rally_core::window::DateWindow;
use rally_db::model::event::Event;
use rally_db::model::invitation::{Invitation, InvitationResponse};
use rally_db::store::{EventStore, InvitationStore};
use rally_recur::{RecurrenceRule, is_sent};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Records a member's answer for one occurrence.
///
/// ## Errors
/// - `ServiceError::ValidationError` if `status` is `pending`.
/// - `ServiceError::NotFound` if the member holds no invitation for that date.
/// - `ServiceError::DatabaseError` if the store fails.
#[tracing::instrument(skip(store))]
pub async fn respond<S>(
    store: &S,
    event_id: Uuid,
    user_id: Uuid,
    occurrence_date: NaiveDate,
    status: InvitationStatus,
    responded_at: DateTime<Utc>,
) -> ServiceResult<Invitation>
where
    S: InvitationStore + ?Sized,
{
    if !status.is_answered() {
        return Err(ServiceError::ValidationError(
            "a response must accept or reject the invitation".to_owned(),
        ));
    }

    store
        .respond(InvitationResponse {
            event_id,
            user_id,
            occurrence_date,
            status,
            responded_at,
        })
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "invitation for event {event_id}, user {user_id} on {occurrence_date}"
            ))
        })
}

/// ## Summary
/// Keeps the records of one event whose dates are still occurrences of `rule`.
///
/// Records for dates excluded or cut off after they were materialized stay in
/// storage; readers hide them with this filter.
#[must_use]
pub fn visible_invitations(records: Vec<Invitation>, rule: &RecurrenceRule) -> Vec<Invitation> {
    records
        .into_iter()
        .filter(|record| rule.is_occurrence(record.occurrence_date))
        .collect()
}

/// ## Summary
/// Lists a member's invitations inside `window`, hiding records whose event is
/// gone or cancelled and records no longer matching their event's schedule.
///
/// ## Errors
/// Returns an error if the store fails.
#[tracing::instrument(skip(store))]
pub async fn visible_invitations_for_user<S>(
    store: &S,
    user_id: Uuid,
    window: DateWindow,
) -> ServiceResult<Vec<Invitation>>
where
    S: InvitationStore + EventStore + ?Sized,
{
    collect_for_user(store, user_id, window, None).await
}

/// ## Summary
/// Like [`visible_invitations_for_user`], but also hides occurrences whose
/// invitation is still held back by the event's lead time at `now`.
///
/// An event with an invalid lead time is logged and treated as having none.
///
/// ## Errors
/// Returns an error if the store fails.
#[tracing::instrument(skip(store))]
pub async fn sent_invitations_for_user<S>(
    store: &S,
    user_id: Uuid,
    window: DateWindow,
    now: NaiveDateTime,
) -> ServiceResult<Vec<Invitation>>
where
    S: InvitationStore + EventStore + ?Sized,
{
    collect_for_user(store, user_id, window, Some(now)).await
}

async fn collect_for_user<S>(
    store: &S,
    user_id: Uuid,
    window: DateWindow,
    sent_by: Option<NaiveDateTime>,
) -> ServiceResult<Vec<Invitation>>
where
    S: InvitationStore + EventStore + ?Sized,
{
    let records = store.invitations_for_user(user_id, window).await?;

    let mut by_event: BTreeMap<Uuid, Vec<Invitation>> = BTreeMap::new();
    for record in records {
        by_event.entry(record.event_id).or_default().push(record);
    }

    let mut visible = Vec::new();
    for (event_id, records) in by_event {
        let Some(event) = store.event(event_id).await? else {
            tracing::debug!(%event_id, "Hiding invitations for a deleted event");
            continue;
        };
        if event.cancelled {
            continue;
        }
        let records = if event.is_recurring() {
            match event.recurrence_rule() {
                Ok(rule) => visible_invitations(records, &rule),
                Err(err) => {
                    tracing::warn!(%event_id, error = %err, "Hiding invitations for an invalid rule");
                    continue;
                }
            }
        } else {
            records
        };
        match sent_by {
            Some(now) => visible.extend(without_held_back(&event, records, now)),
            None => visible.extend(records),
        }
    }

    visible.sort_by_key(|record| (record.occurrence_date, record.event_id));
    Ok(visible)
}

fn without_held_back(event: &Event, records: Vec<Invitation>, now: NaiveDateTime) -> Vec<Invitation> {
    let lead_time = event.lead_time().unwrap_or_else(|err| {
        tracing::warn!(event_id = %event.id, error = %err, "Ignoring invalid lead time");
        None
    });
    records
        .into_iter()
        .filter(|record| is_sent(lead_time, record.occurrence_date, event.start_time, now))
        .collect()
}
