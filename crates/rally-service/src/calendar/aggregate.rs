use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use rally_core::window::DateWindow;
use rally_db::model::event::Event;
use rally_recur::{ExpansionOutcome, expand};
use serde::Serialize;
use uuid::Uuid;

use super::context::DisplayContext;

/// One occurrence as shown in a calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccurrenceSummary {
    pub event_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub group_key: String,
    pub is_recurring: bool,
}

impl OccurrenceSummary {
    fn new(event: &Event, date: NaiveDate, context: &DisplayContext, is_recurring: bool) -> Self {
        Self {
            event_id: event.id,
            date,
            title: event.title.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location.clone(),
            group_key: context.group_key(event),
            is_recurring,
        }
    }
}

/// An event left out of the calendar because its row is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEvent {
    pub event_id: Uuid,
    pub reason: String,
}

/// Occurrences bucketed by date. Days without occurrences have no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub window: DateWindow,
    pub days: BTreeMap<NaiveDate, Vec<OccurrenceSummary>>,
    pub skipped: Vec<SkippedEvent>,
}

impl CalendarView {
    fn empty(window: DateWindow) -> Self {
        Self {
            window,
            days: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    /// Occurrences on `date`, in insertion order.
    #[must_use]
    pub fn on(&self, date: NaiveDate) -> &[OccurrenceSummary] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    fn push(&mut self, summary: OccurrenceSummary) {
        self.days.entry(summary.date).or_default().push(summary);
    }

    fn skip(&mut self, event: &Event, reason: impl std::fmt::Display) {
        tracing::warn!(event_id = %event.id, %reason, "Skipping malformed event");
        self.skipped.push(SkippedEvent {
            event_id: event.id,
            reason: reason.to_string(),
        });
    }
}

/// ## Summary
/// Projects recurring and one-off events onto the days of `window`.
///
/// Cancelled events are ignored. A recurring event whose rule cannot be built
/// is skipped and listed in `skipped`; the rest are still placed. Multiple
/// occurrences on the same day are all kept.
#[tracing::instrument(skip_all, fields(%window, recurring = recurring.len(), single = single.len()))]
#[must_use]
pub fn aggregate(
    recurring: &[Event],
    single: &[Event],
    context: &DisplayContext,
    window: &DateWindow,
) -> CalendarView {
    let mut view = CalendarView::empty(*window);

    for event in recurring.iter().filter(|event| !event.cancelled) {
        let rule = match event.recurrence_rule() {
            Ok(rule) => rule,
            Err(err) => {
                view.skip(event, err);
                continue;
            }
        };
        let expansion = expand(&rule, window);
        if expansion.outcome == ExpansionOutcome::CapReached {
            tracing::warn!(event_id = %event.id, "Calendar shows a truncated series");
        }
        for date in expansion.dates {
            view.push(OccurrenceSummary::new(event, date, context, true));
        }
    }

    for event in single.iter().filter(|event| !event.cancelled) {
        match event.start_date {
            Some(date) if window.contains(date) => {
                view.push(OccurrenceSummary::new(event, date, context, false));
            }
            Some(_) => {}
            None => view.skip(event, "event has no date"),
        }
    }

    tracing::debug!(
        occurrences = view.occurrence_count(),
        skipped = view.skipped.len(),
        "Aggregated calendar"
    );
    view
}

/// ## Summary
/// Splits mixed event rows into recurring and one-off events and aggregates them.
#[must_use]
pub fn aggregate_events(events: &[Event], context: &DisplayContext, window: &DateWindow) -> CalendarView {
    let (recurring, single): (Vec<Event>, Vec<Event>) =
        events.iter().cloned().partition(Event::is_recurring);
    aggregate(&recurring, &single, context, window)
}
