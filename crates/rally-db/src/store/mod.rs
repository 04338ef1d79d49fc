//! Async store interfaces used by the services.
//!
//! Every method returns a boxed `Send` future so implementations can be
//! shared behind an `Arc` across spawned tasks.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use rally_core::window::DateWindow;
use uuid::Uuid;

use crate::error::DbResult;
use crate::model::event::Event;
use crate::model::invitation::{Invitation, InvitationResponse, NewInvitation};
use crate::model::subgroup::Subgroup;

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Result of an insert-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A record for the same `(event_id, user_id, occurrence_date)` already existed.
    AlreadyPresent,
}

pub trait InvitationStore: Send + Sync {
    /// Occurrence dates the user already holds invitations for.
    fn occurrence_dates(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'_, DbResult<BTreeSet<NaiveDate>>>;

    /// Inserts a record unless its key already exists. A duplicate is not an error.
    fn insert_pending(&self, invitation: NewInvitation) -> BoxFuture<'_, DbResult<InsertOutcome>>;

    /// Distinct users holding any invitation to the event.
    fn invited_users(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Uuid>>>;

    /// A user's invitations inside `window`, ordered by date.
    fn invitations_for_user(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Invitation>>>;

    /// Applies an answer; `None` when the invitation does not exist.
    fn respond(&self, response: InvitationResponse) -> BoxFuture<'_, DbResult<Option<Invitation>>>;
}

pub trait EventStore: Send + Sync {
    fn event(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Option<Event>>>;

    /// Live events of a club that may have an occurrence inside `window`.
    fn events_in_window(
        &self,
        club_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Event>>>;

    /// Live events of a club that carry a repeat type.
    fn recurring_events(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Event>>>;

    fn subgroups(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Subgroup>>>;

    /// Replaces an event's end date and cancelled dates; `None` when the event does not exist.
    fn update_schedule(
        &self,
        event_id: Uuid,
        repeat_end_date: Option<NaiveDate>,
        excluded_dates: Vec<NaiveDate>,
    ) -> BoxFuture<'_, DbResult<Option<Event>>>;
}
