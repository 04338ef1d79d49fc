use std::collections::BTreeSet;

use chrono::NaiveDate;
use rally_core::window::DateWindow;
use rally_db::model::event::Event;
use rally_db::model::invitation::NewInvitation;
use rally_db::store::{InsertOutcome, InvitationStore};
use rally_recur::{ExpansionOutcome, RecurrenceRule, expand};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ServiceResult;

/// An insert that failed for a reason other than the record already existing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedInsert {
    pub date: NaiveDate,
    pub retryable: bool,
    pub message: String,
}

/// What one materialization pass did for one `(event, user)` pair.
///
/// Dates the caller already listed as existing are skipped and appear in no
/// list; `already_present` holds dates another writer inserted concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub created: Vec<NaiveDate>,
    pub already_present: Vec<NaiveDate>,
    pub failed: Vec<FailedInsert>,
    pub outcome: ExpansionOutcome,
}

impl MaterializeReport {
    const fn new(event_id: Uuid, user_id: Uuid, outcome: ExpansionOutcome) -> Self {
        Self {
            event_id,
            user_id,
            created: Vec::new(),
            already_present: Vec::new(),
            failed: Vec::new(),
            outcome,
        }
    }

    /// Whether every missing date is now stored.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// A user whose materialization could not start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserFailure {
    pub user_id: Uuid,
    pub retryable: bool,
    pub message: String,
}

/// Per-user results for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventMaterialization {
    pub event_id: Uuid,
    pub reports: Vec<MaterializeReport>,
    pub failures: Vec<UserFailure>,
}

impl EventMaterialization {
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.reports.iter().map(|report| report.created.len()).sum()
    }

    #[must_use]
    pub fn already_present_count(&self) -> usize {
        self.reports
            .iter()
            .map(|report| report.already_present.len())
            .sum()
    }

    #[must_use]
    pub fn failed_insert_count(&self) -> usize {
        self.reports.iter().map(MaterializeReport::failed_count).sum()
    }
}

/// ## Summary
/// Inserts a `pending` invitation for every occurrence of `rule` in `window`
/// that is not in `existing`.
///
/// Never updates or deletes. Each insert is insert-if-absent, so concurrent
/// or repeated calls converge on one record per date. A failed insert is
/// logged and recorded in the report; the remaining dates are still tried.
#[tracing::instrument(skip(store, rule, existing))]
pub async fn materialize<S>(
    store: &S,
    rule: &RecurrenceRule,
    event_id: Uuid,
    user_id: Uuid,
    existing: &BTreeSet<NaiveDate>,
    window: &DateWindow,
) -> MaterializeReport
where
    S: InvitationStore + ?Sized,
{
    let expansion = expand(rule, window);
    let mut report = MaterializeReport::new(event_id, user_id, expansion.outcome);

    for date in expansion
        .dates
        .into_iter()
        .filter(|date| !existing.contains(date))
    {
        match store
            .insert_pending(NewInvitation::pending(event_id, user_id, date))
            .await
        {
            Ok(InsertOutcome::Inserted) => report.created.push(date),
            Ok(InsertOutcome::AlreadyPresent) => report.already_present.push(date),
            Err(err) => {
                let retryable = err.is_retryable();
                tracing::warn!(%date, retryable, error = %err, "Failed to insert invitation");
                report.failed.push(FailedInsert {
                    date,
                    retryable,
                    message: err.to_string(),
                });
            }
        }
    }

    tracing::debug!(
        created = report.created.len(),
        already_present = report.already_present.len(),
        failed = report.failed.len(),
        "Materialized invitations"
    );

    report
}

/// ## Summary
/// Reads the user's existing dates, then materializes the missing ones.
///
/// ## Errors
/// Returns the store error if reading existing dates fails; nothing is
/// written in that case.
pub async fn materialize_for_user<S>(
    store: &S,
    rule: &RecurrenceRule,
    event_id: Uuid,
    user_id: Uuid,
    window: &DateWindow,
) -> ServiceResult<MaterializeReport>
where
    S: InvitationStore + ?Sized,
{
    let existing = store.occurrence_dates(event_id, user_id).await?;
    Ok(materialize(store, rule, event_id, user_id, &existing, window).await)
}

/// ## Summary
/// Materializes `event` for each of `users`.
///
/// A user whose existing dates cannot be read is listed in `failures`;
/// the other users are still processed.
///
/// ## Errors
/// Returns a `RecurError` if the event is not a valid recurring event.
pub async fn materialize_for_users<S>(
    store: &S,
    event: &Event,
    users: &[Uuid],
    window: &DateWindow,
) -> ServiceResult<EventMaterialization>
where
    S: InvitationStore + ?Sized,
{
    let rule = event.recurrence_rule()?;
    Ok(materialize_rule_for_users(store, &rule, event.id, users, window).await)
}

/// ## Summary
/// Materializes `event` for every user already invited to it.
///
/// ## Errors
/// Returns an error if the event is not a valid recurring event or the
/// invitee list cannot be read.
pub async fn materialize_event<S>(
    store: &S,
    event: &Event,
    window: &DateWindow,
) -> ServiceResult<EventMaterialization>
where
    S: InvitationStore + ?Sized,
{
    let rule = event.recurrence_rule()?;
    let users = store.invited_users(event.id).await?;
    Ok(materialize_rule_for_users(store, &rule, event.id, &users, window).await)
}

#[tracing::instrument(skip(store, rule, users), fields(users = users.len()))]
async fn materialize_rule_for_users<S>(
    store: &S,
    rule: &RecurrenceRule,
    event_id: Uuid,
    users: &[Uuid],
    window: &DateWindow,
) -> EventMaterialization
where
    S: InvitationStore + ?Sized,
{
    let mut result = EventMaterialization {
        event_id,
        reports: Vec::with_capacity(users.len()),
        failures: Vec::new(),
    };

    for &user_id in users {
        match materialize_for_user(store, rule, event_id, user_id, window).await {
            Ok(report) => result.reports.push(report),
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "Skipping user; existing invitations unreadable");
                result.failures.push(UserFailure {
                    user_id,
                    retryable: err.is_retryable(),
                    message: err.to_string(),
                });
            }
        }
    }

    result
}
