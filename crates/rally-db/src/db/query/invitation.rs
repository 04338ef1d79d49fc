//! Query composition for `event_invitations`.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rally_core::window::DateWindow;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::enums::StatusColumn;
use crate::db::schema::event_invitations;
use crate::model::invitation::{Invitation, InvitationResponse, NewInvitation};

/// ## Summary
/// Lists the occurrence dates a user already holds invitations for.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn occurrence_dates(
    conn: &mut DbConnection<'_>,
    event_id: Uuid,
    user_id: Uuid,
) -> QueryResult<Vec<NaiveDate>> {
    event_invitations::table
        .filter(event_invitations::event_id.eq(event_id))
        .filter(event_invitations::user_id.eq(user_id))
        .select(event_invitations::occurrence_date)
        .order(event_invitations::occurrence_date.asc())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts an invitation unless one already exists for the same
/// `(event_id, user_id, occurrence_date)`.
///
/// Returns the number of rows written: `0` when the record was already there.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert_if_absent(
    conn: &mut DbConnection<'_>,
    invitation: &NewInvitation,
) -> QueryResult<usize> {
    diesel::insert_into(event_invitations::table)
        .values(invitation)
        .on_conflict((
            event_invitations::event_id,
            event_invitations::user_id,
            event_invitations::occurrence_date,
        ))
        .do_nothing()
        .execute(conn)
        .await
}

/// ## Summary
/// Lists the distinct users holding any invitation to an event.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn invited_users(conn: &mut DbConnection<'_>, event_id: Uuid) -> QueryResult<Vec<Uuid>> {
    event_invitations::table
        .filter(event_invitations::event_id.eq(event_id))
        .select(event_invitations::user_id)
        .distinct()
        .order(event_invitations::user_id.asc())
        .load(conn)
        .await
}

/// ## Summary
/// Lists a user's invitations with occurrence dates inside `window`.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn for_user(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    window: &DateWindow,
) -> QueryResult<Vec<Invitation>> {
    event_invitations::table
        .filter(event_invitations::user_id.eq(user_id))
        .filter(event_invitations::occurrence_date.between(window.start(), window.end()))
        .order((
            event_invitations::occurrence_date.asc(),
            event_invitations::event_id.asc(),
        ))
        .select(Invitation::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Records a member's answer. Returns `None` when no matching invitation exists.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn respond(
    conn: &mut DbConnection<'_>,
    response: &InvitationResponse,
) -> QueryResult<Option<Invitation>> {
    diesel::update(
        event_invitations::table
            .filter(event_invitations::event_id.eq(response.event_id))
            .filter(event_invitations::user_id.eq(response.user_id))
            .filter(event_invitations::occurrence_date.eq(response.occurrence_date)),
    )
    .set((
        event_invitations::status.eq(StatusColumn::from(response.status)),
        event_invitations::responded_at.eq(Some(response.responded_at)),
    ))
    .returning(Invitation::as_returning())
    .get_result(conn)
    .await
    .optional()
}
