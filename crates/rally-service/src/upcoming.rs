//! "What's next" lookup for event lists.

use chrono::{NaiveDate, NaiveTime};
use rally_db::model::event::Event;
use rally_recur::next_occurrence;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingEvent {
    pub event_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub is_recurring: bool,
}

/// ## Summary
/// The next occurrence on or after `today` of each live event, soonest first.
///
/// Ties are ordered by title. Events without a future occurrence are left
/// out, as are malformed rows (logged at `warn`). At most `limit` entries are
/// returned.
#[must_use]
pub fn upcoming(events: &[Event], today: NaiveDate, limit: usize) -> Vec<UpcomingEvent> {
    let mut found: Vec<UpcomingEvent> = events
        .iter()
        .filter(|event| !event.cancelled)
        .filter_map(|event| {
            let is_recurring = event.is_recurring();
            let date = if is_recurring {
                match event.recurrence_rule() {
                    Ok(rule) => next_occurrence(&rule, today),
                    Err(err) => {
                        tracing::warn!(event_id = %event.id, error = %err, "Skipping malformed event");
                        None
                    }
                }
            } else {
                event.start_date.filter(|date| *date >= today)
            }?;
            Some(UpcomingEvent {
                event_id: event.id,
                title: event.title.clone(),
                date,
                start_time: event.start_time,
                is_recurring,
            })
        })
        .collect();

    found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
    found.truncate(limit);
    found
}
