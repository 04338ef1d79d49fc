//! `PostgreSQL` store over a bb8 connection pool.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use diesel::result::DatabaseErrorKind;
use futures::future::BoxFuture;
use rally_core::window::DateWindow;
use uuid::Uuid;

use crate::db::DbProvider;
use crate::db::connection::DbPool;
use crate::db::query;
use crate::error::DbResult;
use crate::model::event::Event;
use crate::model::invitation::{Invitation, InvitationResponse, NewInvitation};
use crate::model::subgroup::Subgroup;
use crate::store::{EventStore, InsertOutcome, InvitationStore};

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl InvitationStore for PgStore {
    fn occurrence_dates(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'_, DbResult<BTreeSet<NaiveDate>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            let dates = query::invitation::occurrence_dates(&mut conn, event_id, user_id).await?;
            Ok(dates.into_iter().collect())
        })
    }

    fn insert_pending(&self, invitation: NewInvitation) -> BoxFuture<'_, DbResult<InsertOutcome>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            match query::invitation::insert_if_absent(&mut conn, &invitation).await {
                Ok(0) => Ok(InsertOutcome::AlreadyPresent),
                Ok(_) => Ok(InsertOutcome::Inserted),
                // A racing writer can still surface the unique index directly
                Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                    Ok(InsertOutcome::AlreadyPresent)
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    fn invited_users(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Uuid>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::invitation::invited_users(&mut conn, event_id).await?)
        })
    }

    fn invitations_for_user(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Invitation>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::invitation::for_user(&mut conn, user_id, &window).await?)
        })
    }

    fn respond(&self, response: InvitationResponse) -> BoxFuture<'_, DbResult<Option<Invitation>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::invitation::respond(&mut conn, &response).await?)
        })
    }
}

impl EventStore for PgStore {
    fn event(&self, event_id: Uuid) -> BoxFuture<'_, DbResult<Option<Event>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::event::by_id(&mut conn, event_id).await?)
        })
    }

    fn events_in_window(
        &self,
        club_id: Uuid,
        window: DateWindow,
    ) -> BoxFuture<'_, DbResult<Vec<Event>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::event::in_window(&mut conn, club_id, &window).await?)
        })
    }

    fn recurring_events(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Event>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::event::recurring(&mut conn, club_id).await?)
        })
    }

    fn subgroups(&self, club_id: Uuid) -> BoxFuture<'_, DbResult<Vec<Subgroup>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(query::subgroup::for_club(&mut conn, club_id).await?)
        })
    }

    fn update_schedule(
        &self,
        event_id: Uuid,
        repeat_end_date: Option<NaiveDate>,
        excluded_dates: Vec<NaiveDate>,
    ) -> BoxFuture<'_, DbResult<Option<Event>>> {
        Box::pin(async move {
            let mut conn = self.pool.get_connection().await?;
            Ok(
                query::event::update_schedule(&mut conn, event_id, repeat_end_date, &excluded_dates)
                    .await?,
            )
        })
    }
}
