//! Calendar projection of a club's events.
//!
//! Read-only: recurring events are expanded over the display window and
//! one-off events placed on their date. Nothing is persisted.

pub mod aggregate;
pub mod context;

pub use aggregate::{CalendarView, OccurrenceSummary, SkippedEvent, aggregate, aggregate_events};
pub use context::DisplayContext;

use rally_core::window::DateWindow;
use rally_db::store::EventStore;
use uuid::Uuid;

use crate::error::ServiceResult;

/// ## Summary
/// Loads a club's events and subgroups and builds the calendar for `window`.
///
/// ## Errors
/// Returns an error if the store fails. Malformed events are listed in
/// `CalendarView::skipped` instead.
#[tracing::instrument(skip(store))]
pub async fn load_calendar<S>(
    store: &S,
    club_id: Uuid,
    window: DateWindow,
) -> ServiceResult<CalendarView>
where
    S: EventStore + ?Sized,
{
    let context = DisplayContext::load(store, club_id).await?;
    let events = store.events_in_window(club_id, window).await?;
    Ok(aggregate_events(&events, &context, &window))
}
