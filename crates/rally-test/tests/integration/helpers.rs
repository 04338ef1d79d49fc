//! Test helpers for integration tests.
//!
//! Provides:
//! - A fault-injecting store wrapper over `MemoryStore`
//! - Access to a migrated Postgres database when one is configured
//!
//! ## Database Access
//! Postgres tests run only when `RALLY_TEST_DATABASE_URL` is set. Every test
//! works on freshly generated club, event and user ids, so tests share one
//! database without truncating it.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use futures::FutureExt;
use futures::future::{BoxFuture, ready};
use tokio::sync::OnceCell;
use uuid::Uuid;

use rally_test::component::db::connection::{create_pool, run_migrations};
use rally_test::component::db::model::event::{Event, NewEvent};
use rally_test::component::db::model::invitation::{Invitation, InvitationResponse, NewInvitation};
use rally_test::component::db::model::subgroup::{NewSubgroup, Subgroup};
use rally_test::component::db::query;
use rally_test::component::db::store::{EventStore, InsertOutcome, InvitationStore, MemoryStore, PgStore};
use rally_test::component::db::{DbError, DbProvider, DbResult};
use rally_test::component::window::DateWindow;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

#[derive(Debug, Default)]
struct Faults {
    insert_dates: BTreeSet<NaiveDate>,
    read_users: BTreeSet<Uuid>,
    listing_clubs: BTreeSet<Uuid>,
}

/// A `MemoryStore` that fails chosen calls with a transient error.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    faults: Mutex<Faults>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        match self.faults.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.faults.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    /// Inserts for `date` fail.
    pub fn fail_inserts_on(&self, date: NaiveDate) {
        self.faults().insert_dates.insert(date);
    }

    /// Reading `user_id`'s existing dates fails.
    pub fn fail_reads_for(&self, user_id: Uuid) {
        self.faults().read_users.insert(user_id);
    }

    /// Listing `club_id`'s recurring events fails.
    pub fn fail_listing_for(&self, club_id: Uuid) {
        self.faults().listing_clubs.insert(club_id);
    }

    fn injected<T: Send + 'static>(what: &str) -> BoxFuture<'static, DbResult<T>> {
        ready(Err(DbError::Unavailable(format!("injected {what} failure")))).boxed()
    }
}

impl InvitationStore for FlakyStore {
    fn occurrence_dates(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'_, DbResult<BTreeSet<NaiveDate>>> {
        if self.faults().read_users.contains(&user_id) {
            return Self::injected("read");
        }
        self.inner.occurrence_dates(event_id, user_id)
    }

    fn insert_pending(&self, invitation: NewInvitation) -> BoxFuture<'_, DbResult<InsertOutcome>> {
        if self.faults().insert_dates.contains(&invitation.occurrence_date) {
            return Self::injected("insert");
        }
        self.inner.insert_pending(invitation)
    }

    fn invited_users(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Uuid>>> {
        self.inner.invited_users(event_id)
    }

    fn invitations_for_user(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Invitation>>> {
        self.inner.invitations_for_user(user_id, window)
    }

    fn respond(&self, response: InvitationResponse) -> BoxFuture<'_, DbResult<Option<Invitation>>> {
        self.inner.respond(response)
    }
}

impl EventStore for FlakyStore {
    fn event(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Option<Event>>> {
        self.inner.event(event_id)
    }

    fn events_in_window(
        &self,
        club_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Event>>> {
        self.inner.events_in_window(club_id, window)
    }

    fn recurring_events(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Event>>> {
        if self.faults().listing_clubs.contains(&club_id) {
            return Self::injected("listing");
        }
        self.inner.recurring_events(club_id)
    }

    fn subgroups(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Subgroup>>> {
        self.inner.subgroups(club_id)
    }

    fn update_schedule(
        &self,
        event_id: Uuid,
        repeat_end_date: Option<NaiveDate>,
        excluded_dates: Vec<NaiveDate>,
    ) -> BoxFuture<'_, DbResult<Option<Event>>> {
        self.inner
            .update_schedule(event_id, repeat_end_date, excluded_dates)
    }
}

/// Set once migrations have run against the test database.
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Postgres test helper.
pub struct TestDb {
    pub store: PgStore,
}

impl TestDb {
    /// ## Summary
    /// Connects to `RALLY_TEST_DATABASE_URL`, migrating it on first use.
    /// Returns `None` when the variable is unset.
    ///
    /// ## Errors
    /// Returns an error if migrations or pool creation fail.
    pub async fn connect() -> anyhow::Result<Option<Self>> {
        let Ok(url) = std::env::var("RALLY_TEST_DATABASE_URL") else {
            tracing::info!("RALLY_TEST_DATABASE_URL not set; skipping Postgres test");
            return Ok(None);
        };

        MIGRATED
            .get_or_try_init(|| async { run_migrations(&url).await })
            .await?;

        let pool = create_pool(&url, 5).await?;
        Ok(Some(Self {
            store: PgStore::new(pool),
        }))
    }

    /// Seeds an event row and returns it as stored.
    ///
    /// ## Errors
    /// Returns an error if the insert fails.
    pub async fn seed_event(&self, event: &NewEvent) -> anyhow::Result<Event> {
        let mut conn = self.store.pool().get_connection().await?;
        Ok(query::event::insert(&mut conn, event).await?)
    }

    /// Seeds a subgroup row.
    ///
    /// ## Errors
    /// Returns an error if the insert fails.
    pub async fn seed_subgroup(&self, subgroup: &NewSubgroup) -> anyhow::Result<Subgroup> {
        let mut conn = self.store.pool().get_connection().await?;
        Ok(query::subgroup::insert(&mut conn, subgroup).await?)
    }
}
