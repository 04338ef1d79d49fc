//! Keeps a club's invitations materialized as its events change.

use std::sync::Arc;

use chrono::NaiveDate;
use rally_core::window::DateWindow;
use rally_db::store::{EventStore, InvitationStore};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use super::feed::{ChangeNotice, ChangedTable};
use crate::error::ServiceResult;
use crate::invitation::materialize_event;

/// Totals for one reload pass over a club.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub events: usize,
    pub created: usize,
    pub already_present: usize,
    pub failed_inserts: usize,
    /// Events skipped entirely: invalid rule or unreadable invitee list.
    pub failed_events: usize,
    /// Users whose existing invitations could not be read.
    pub failed_users: usize,
}

impl SyncSummary {
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed_inserts == 0 && self.failed_events == 0 && self.failed_users == 0
    }
}

/// Materializes the lookahead window for every recurring event of a club.
///
/// Reloads are idempotent, so overlapping runs (a notice arriving while a
/// sweep is in flight) converge on the same ledger.
pub struct InvitationSync<S: ?Sized> {
    store: Arc<S>,
    lookahead_weeks: u32,
}

impl<S: ?Sized> Clone for InvitationSync<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lookahead_weeks: self.lookahead_weeks,
        }
    }
}

impl<S> InvitationSync<S>
where
    S: InvitationStore + EventStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: Arc<S>, lookahead_weeks: u32) -> Self {
        Self {
            store,
            lookahead_weeks,
        }
    }

    #[must_use]
    pub const fn lookahead_weeks(&self) -> u32 {
        self.lookahead_weeks
    }

    /// ## Summary
    /// Runs one full reload for `club_id` with the window starting at `today`.
    ///
    /// Per-event failures are logged and counted, not returned.
    ///
    /// ## Errors
    /// Returns an error if the club's events cannot be listed.
    #[tracing::instrument(skip(self), fields(weeks = self.lookahead_weeks))]
    pub async fn reload(&self, club_id: Uuid, today: NaiveDate) -> ServiceResult<SyncSummary> {
        let window = DateWindow::lookahead(today, self.lookahead_weeks);
        let events = self.store.recurring_events(club_id).await?;
        let mut summary = SyncSummary {
            events: events.len(),
            ..SyncSummary::default()
        };

        for event in &events {
            match materialize_event(&*self.store, event, &window).await {
                Ok(result) => {
                    summary.created += result.created_count();
                    summary.already_present += result.already_present_count();
                    summary.failed_inserts += result.failed_insert_count();
                    summary.failed_users += result.failures.len();
                }
                Err(err) => {
                    tracing::warn!(event_id = %event.id, error = %err, "Skipping event during reload");
                    summary.failed_events += 1;
                }
            }
        }

        tracing::info!(
            events = summary.events,
            created = summary.created,
            already_present = summary.already_present,
            failed_inserts = summary.failed_inserts,
            failed_events = summary.failed_events,
            failed_users = summary.failed_users,
            "Invitation reload finished"
        );
        Ok(summary)
    }

    /// ## Summary
    /// Reloads on every events-table notice until the feed closes.
    ///
    /// A lagged receiver has missed notices, so one full reload is run in
    /// their place. `today` is read at each reload. Returns the number of
    /// reloads performed.
    #[tracing::instrument(skip(self, receiver, today))]
    pub async fn run<F>(
        &self,
        mut receiver: broadcast::Receiver<ChangeNotice>,
        club_id: Uuid,
        today: F,
    ) -> usize
    where
        F: Fn() -> NaiveDate + Send + Sync,
    {
        let mut reloads = 0;
        loop {
            match receiver.recv().await {
                Ok(notice) if notice.table == ChangedTable::Events => {
                    tracing::debug!(record_id = ?notice.record_id, "Events changed; reloading");
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Change feed lagged; running full reload");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!(reloads, "Change feed closed");
                    return reloads;
                }
            }

            if let Err(err) = self.reload(club_id, today()).await {
                tracing::warn!(
                    error = %err,
                    retryable = err.is_retryable(),
                    "Reload failed; waiting for the next notice"
                );
            }
            reloads += 1;
        }
    }
}
