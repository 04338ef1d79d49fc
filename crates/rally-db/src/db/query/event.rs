//! Query composition for `events`.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rally_core::window::DateWindow;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::events;
use crate::model::event::{Event, NewEvent};

/// ## Summary
/// Loads one event by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn by_id(conn: &mut DbConnection<'_>, event_id: Uuid) -> QueryResult<Option<Event>> {
    events::table
        .find(event_id)
        .select(Event::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists a club's live events that may appear in `window`.
///
/// One-off events outside the window are pruned here; recurring rows that
/// start before the window end are returned for expansion. Rows without a
/// start date are kept so callers can report them.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn in_window(
    conn: &mut DbConnection<'_>,
    club_id: Uuid,
    window: &DateWindow,
) -> QueryResult<Vec<Event>> {
    events::table
        .filter(events::club_id.eq(club_id))
        .filter(events::cancelled.eq(false))
        .filter(
            events::start_date
                .is_null()
                .or(events::start_date.le(window.end())),
        )
        .filter(
            events::start_date
                .is_null()
                .or(events::repeat_type.is_not_null())
                .or(events::start_date.ge(window.start())),
        )
        .order((events::start_date.asc(), events::title.asc()))
        .select(Event::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Lists a club's live events that carry a repeat type.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn recurring(conn: &mut DbConnection<'_>, club_id: Uuid) -> QueryResult<Vec<Event>> {
    events::table
        .filter(events::club_id.eq(club_id))
        .filter(events::cancelled.eq(false))
        .filter(events::repeat_type.is_not_null())
        .filter(events::repeat_type.ne(""))
        .filter(events::repeat_type.ne("none"))
        .order(events::created_at.asc())
        .select(Event::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Inserts an event and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, event: &NewEvent) -> QueryResult<Event> {
    diesel::insert_into(events::table)
        .values(event)
        .returning(Event::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Replaces the end date and cancelled dates of an event's schedule.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn update_schedule(
    conn: &mut DbConnection<'_>,
    event_id: Uuid,
    repeat_end_date: Option<NaiveDate>,
    excluded_dates: &[NaiveDate],
) -> QueryResult<Option<Event>> {
    diesel::update(events::table.find(event_id))
        .set((
            events::repeat_end_date.eq(repeat_end_date),
            events::excluded_dates.eq(excluded_dates),
        ))
        .returning(Event::as_returning())
        .get_result(conn)
        .await
        .optional()
}
