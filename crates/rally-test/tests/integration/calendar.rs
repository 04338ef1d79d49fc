//! Calendar and upcoming views loaded through the store.

use chrono::NaiveTime;
use uuid::Uuid;

use rally_test::component::calendar::load_calendar;
use rally_test::component::constants::DEFAULT_GROUP_COLOR;
use rally_test::component::db::model::event::NewEvent;
use rally_test::component::db::model::subgroup::NewSubgroup;
use rally_test::component::db::store::{EventStore, MemoryStore};
use rally_test::component::types::RepeatType;
use rally_test::component::upcoming::upcoming;
use rally_test::component::window::DateWindow;

use super::helpers::date;

#[test_log::test(tokio::test)]
async fn month_view_mixes_recurring_and_single_events() {
    let store = MemoryStore::new();
    let club = Uuid::now_v7();
    let seniors = store.insert_subgroup(NewSubgroup::new(club, "Seniors", Some("#ef4444")));
    let training = store.insert_event(
        NewEvent::recurring(club, "Training", date(2024, 5, 6), RepeatType::Weekly)
            .with_subgroups([seniors.id])
            .with_times(
                NaiveTime::from_hms_opt(19, 0, 0).expect("valid time"),
                NaiveTime::from_hms_opt(21, 0, 0).expect("valid time"),
            ),
    );
    let derby = store.insert_event(NewEvent::single(club, "Derby", date(2024, 6, 10)));
    store.insert_event(NewEvent::single(club, "Last season", date(2024, 5, 30)));
    store.insert_event(NewEvent::single(Uuid::now_v7(), "Other club", date(2024, 6, 10)));

    let view = load_calendar(&store, club, DateWindow::month(2024, 6).expect("valid month"))
        .await
        .expect("reads succeed");

    // Mondays in June 2024
    let training_days: Vec<_> = view
        .days
        .iter()
        .filter(|(_, occurrences)| occurrences.iter().any(|o| o.event_id == training.id))
        .map(|(day, _)| *day)
        .collect();
    assert_eq!(
        training_days,
        vec![
            date(2024, 6, 3),
            date(2024, 6, 10),
            date(2024, 6, 17),
            date(2024, 6, 24)
        ]
    );

    let tenth = view.on(date(2024, 6, 10));
    assert_eq!(tenth.len(), 2);
    let derby_cell = tenth
        .iter()
        .find(|o| o.event_id == derby.id)
        .expect("derby is shown");
    assert_eq!(derby_cell.group_key, DEFAULT_GROUP_COLOR);
    let training_cell = tenth
        .iter()
        .find(|o| o.event_id == training.id)
        .expect("training is shown");
    assert_eq!(training_cell.group_key, "#ef4444");
    assert_eq!(view.occurrence_count(), 5);
}

#[test_log::test(tokio::test)]
async fn broken_rows_are_listed_not_fatal() {
    let store = MemoryStore::new();
    let club = Uuid::now_v7();
    let mut broken = NewEvent::recurring(club, "Broken", date(2024, 6, 1), RepeatType::Daily);
    broken.repeat_type = Some("hourly".into());
    let broken = store.insert_event(broken);
    store.insert_event(NewEvent::recurring(club, "Fine", date(2024, 6, 1), RepeatType::Daily));

    let view = load_calendar(&store, club, DateWindow::month(2024, 6).expect("valid month"))
        .await
        .expect("reads succeed");

    assert_eq!(view.skipped.len(), 1);
    assert_eq!(view.skipped[0].event_id, broken.id);
    assert_eq!(view.occurrence_count(), 30);
}

#[test_log::test(tokio::test)]
async fn upcoming_uses_next_valid_occurrence() {
    let store = MemoryStore::new();
    let club = Uuid::now_v7();
    store.insert_event(
        NewEvent::recurring(club, "Training", date(2024, 6, 3), RepeatType::Weekly)
            .with_excluded_dates([date(2024, 6, 17)]),
    );
    store.insert_event(NewEvent::single(club, "Derby", date(2024, 6, 20)));
    store.insert_event(NewEvent::single(club, "Past", date(2024, 6, 1)));

    let window = DateWindow::lookahead(date(2024, 6, 12), 4);
    let events = store
        .events_in_window(club, window)
        .await
        .expect("read succeeds");
    let next = upcoming(&events, date(2024, 6, 12), 5);

    let titles: Vec<_> = next
        .iter()
        .map(|entry| (entry.title.as_str(), entry.date))
        .collect();
    assert_eq!(
        titles,
        vec![("Derby", date(2024, 6, 20)), ("Training", date(2024, 6, 24))]
    );
}
