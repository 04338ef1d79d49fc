//! In-process store used by tests and local tooling.
//!
//! Invitations are keyed by `(event_id, user_id, occurrence_date)`, so the
//! uniqueness invariant holds by construction.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use rally_core::window::DateWindow;
use uuid::Uuid;

use crate::db::enums::StatusColumn;
use crate::error::DbResult;
use crate::model::event::{Event, NewEvent};
use crate::model::invitation::{Invitation, InvitationResponse, NewInvitation};
use crate::model::subgroup::{NewSubgroup, Subgroup};
use crate::store::{EventStore, InsertOutcome, InvitationStore};

type InvitationKey = (Uuid, Uuid, NaiveDate);

#[derive(Debug, Default)]
struct Tables {
    events: BTreeMap<Uuid, Event>,
    subgroups: BTreeMap<Uuid, Subgroup>,
    invitations: BTreeMap<InvitationKey, Invitation>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the tables and recovers from poisoning.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.tables.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    pub fn insert_event(&self, event: NewEvent) -> Event {
        let event = event.into_event(Utc::now());
        self.lock().events.insert(event.id, event.clone());
        event
    }

    pub fn insert_subgroup(&self, subgroup: NewSubgroup) -> Subgroup {
        let subgroup = subgroup.into_subgroup();
        self.lock().subgroups.insert(subgroup.id, subgroup.clone());
        subgroup
    }

    /// Snapshot of every stored invitation, ordered by key.
    #[must_use]
    pub fn invitations(&self) -> Vec<Invitation> {
        self.lock().invitations.values().cloned().collect()
    }

    fn insert_invitation(&self, invitation: &NewInvitation) -> InsertOutcome {
        let key = (
            invitation.event_id,
            invitation.user_id,
            invitation.occurrence_date,
        );
        let mut tables = self.lock();
        if tables.invitations.contains_key(&key) {
            return InsertOutcome::AlreadyPresent;
        }
        tables.invitations.insert(
            key,
            Invitation {
                id: Uuid::now_v7(),
                event_id: invitation.event_id,
                user_id: invitation.user_id,
                occurrence_date: invitation.occurrence_date,
                status: invitation.status,
                responded_at: None,
                created_at: Utc::now(),
            },
        );
        InsertOutcome::Inserted
    }

    fn apply_response(&self, response: &InvitationResponse) -> Option<Invitation> {
        let key = (
            response.event_id,
            response.user_id,
            response.occurrence_date,
        );
        let mut tables = self.lock();
        let record = tables.invitations.get_mut(&key)?;
        record.status = StatusColumn::from(response.status);
        record.responded_at = Some(response.responded_at);
        Some(record.clone())
    }

    fn club_events(&self, club_id: Uuid, keep: impl Fn(&Event) -> bool) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .lock()
            .events
            .values()
            .filter(|event| event.club_id == club_id && !event.cancelled && keep(event))
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.title.cmp(&b.title))
        });
        events
    }
}

impl InvitationStore for MemoryStore {
    fn occurrence_dates(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'_, DbResult<BTreeSet<NaiveDate>>> {
        let dates = self
            .lock()
            .invitations
            .keys()
            .filter(|(event, user, _)| *event == event_id && *user == user_id)
            .map(|(_, _, date)| *date)
            .collect();
        ready(Ok(dates)).boxed()
    }

    fn insert_pending(&self, invitation: NewInvitation) -> BoxFuture<'_, DbResult<InsertOutcome>> {
        ready(Ok(self.insert_invitation(&invitation))).boxed()
    }

    fn invited_users(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Uuid>>> {
        let users: BTreeSet<Uuid> = self
            .lock()
            .invitations
            .keys()
            .filter(|(event, _, _)| *event == event_id)
            .map(|(_, user, _)| *user)
            .collect();
        ready(Ok(users.into_iter().collect())).boxed()
    }

    fn invitations_for_user(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Invitation>>> {
        let mut records: Vec<Invitation> = self
            .lock()
            .invitations
            .values()
            .filter(|record| record.user_id == user_id && window.contains(record.occurrence_date))
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.occurrence_date, record.event_id));
        ready(Ok(records)).boxed()
    }

    fn respond(&self, response: InvitationResponse) -> BoxFuture<'_, DbResult<Option<Invitation>>> {
        ready(Ok(self.apply_response(&response))).boxed()
    }
}

impl EventStore for MemoryStore {
    fn event(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Option<Event>>> {
        let event = self.lock().events.get(&event_id).cloned();
        ready(Ok(event)).boxed()
    }

    fn events_in_window(
        &self,
        club_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Event>>> {
        let events = self.club_events(club_id, |event| match event.start_date {
            None => true,
            Some(start) => {
                start <= window.end() && (event.repeat_type.is_some() || start >= window.start())
            }
        });
        ready(Ok(events)).boxed()
    }

    fn recurring_events(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Event>>> {
        ready(Ok(self.club_events(club_id, Event::is_recurring))).boxed()
    }

    fn subgroups(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Subgroup>>> {
        let mut subgroups: Vec<Subgroup> = self
            .lock()
            .subgroups
            .values()
            .filter(|subgroup| subgroup.club_id == club_id)
            .cloned()
            .collect();
        subgroups.sort_by(|a, b| a.name.cmp(&b.name));
        ready(Ok(subgroups)).boxed()
    }

    fn update_schedule(
        &self,
        event_id: Uuid,
        repeat_end_date: Option<NaiveDate>,
        excluded_dates: Vec<NaiveDate>,
    ) -> BoxFuture<'_, DbResult<Option<Event>>> {
        let updated = self.lock().events.get_mut(&event_id).map(|event| {
            event.repeat_end_date = repeat_end_date;
            event.excluded_dates = excluded_dates;
            event.clone()
        });
        ready(Ok(updated)).boxed()
    }
}
