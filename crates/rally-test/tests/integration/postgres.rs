//! Round trips against a real database. Skipped unless
//! `RALLY_TEST_DATABASE_URL` is set.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use rally_test::component::calendar::load_calendar;
use rally_test::component::db::model::event::NewEvent;
use rally_test::component::db::model::invitation::NewInvitation;
use rally_test::component::db::model::subgroup::NewSubgroup;
use rally_test::component::db::store::{EventStore, InsertOutcome, InvitationStore};
use rally_test::component::invitation::{materialize, respond, visible_invitations_for_user};
use rally_test::component::schedule::cancel_occurrence;
use rally_test::component::recur::LeadTime;
use rally_test::component::types::{InvitationStatus, LeadTimeUnit, RepeatType};
use rally_test::component::window::DateWindow;

use super::helpers::{TestDb, date};

#[test_log::test(tokio::test)]
async fn duplicate_insert_is_already_present() {
    let Some(db) = TestDb::connect().await.expect("test database is usable") else {
        return;
    };
    let record = NewInvitation::pending(Uuid::now_v7(), Uuid::now_v7(), date(2024, 6, 3));

    let first = db.store.insert_pending(record.clone()).await.expect("insert succeeds");
    let second = db.store.insert_pending(record).await.expect("insert succeeds");

    assert_eq!(first, InsertOutcome::Inserted);
    assert_eq!(second, InsertOutcome::AlreadyPresent);
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_materialization_keeps_unique_index() {
    let Some(db) = TestDb::connect().await.expect("test database is usable") else {
        return;
    };
    let event = db
        .seed_event(&NewEvent::recurring(
            Uuid::now_v7(),
            "Training",
            date(2024, 6, 3),
            RepeatType::Daily,
        ))
        .await
        .expect("seed succeeds");
    let rule = event.recurrence_rule().expect("valid rule");
    let user_id = Uuid::now_v7();
    let window = DateWindow::new(date(2024, 6, 3), date(2024, 6, 16)).expect("valid window");
    let store = Arc::new(db.store);

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let rule = rule.clone();
            let event_id = event.id;
            tokio::spawn(async move {
                let existing = std::collections::BTreeSet::new();
                materialize(&*store, &rule, event_id, user_id, &existing, &window).await
            })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        let report = task.await.expect("task completes");
        assert!(report.succeeded(), "{:?}", report.failed);
        created += report.created.len();
    }

    assert_eq!(created, 14);
    let stored = store
        .occurrence_dates(event.id, user_id)
        .await
        .expect("read succeeds");
    assert_eq!(stored.len(), 14);
}

#[test_log::test(tokio::test)]
async fn schedule_edit_and_response_round_trip() {
    let Some(db) = TestDb::connect().await.expect("test database is usable") else {
        return;
    };
    let club = Uuid::now_v7();
    let juniors = db
        .seed_subgroup(&NewSubgroup::new(club, "Juniors", Some("#22c55e")))
        .await
        .expect("seed succeeds");
    let event = db
        .seed_event(
            &NewEvent::recurring(club, "Training", date(2024, 6, 3), RepeatType::Weekly)
                .with_subgroups([juniors.id])
                .with_location("Pitch 2"),
        )
        .await
        .expect("seed succeeds");
    let user_id = Uuid::now_v7();
    let window = DateWindow::new(date(2024, 6, 3), date(2024, 6, 30)).expect("valid window");
    let rule = event.recurrence_rule().expect("valid rule");

    let report = materialize(
        &db.store,
        &rule,
        event.id,
        user_id,
        &std::collections::BTreeSet::new(),
        &window,
    )
    .await;
    assert_eq!(report.created.len(), 4);

    let answered = respond(
        &db.store,
        event.id,
        user_id,
        date(2024, 6, 10),
        InvitationStatus::Rejected,
        Utc::now(),
    )
    .await
    .expect("invitation exists");
    assert_eq!(answered.status(), InvitationStatus::Rejected);

    let edited = cancel_occurrence(&db.store, event.id, date(2024, 6, 17))
        .await
        .expect("date is an occurrence");
    assert_eq!(edited.excluded_dates, vec![date(2024, 6, 17)]);

    let visible = visible_invitations_for_user(&db.store, user_id, window)
        .await
        .expect("reads succeed");
    assert_eq!(visible.len(), 3);

    let stored = db.store.event(event.id).await.expect("read succeeds").expect("event exists");
    assert_eq!(stored.excluded_dates, vec![date(2024, 6, 17)]);

    let view = load_calendar(&db.store, club, window).await.expect("reads succeed");
    assert_eq!(view.occurrence_count(), 3);
    assert!(view.days.values().flatten().all(|o| o.group_key == "#22c55e"));
    assert!(
        view.days
            .values()
            .flatten()
            .all(|o| o.location.as_deref() == Some("Pitch 2"))
    );
}

#[test_log::test(tokio::test)]
async fn undated_one_off_rows_reach_the_calendar() {
    let Some(db) = TestDb::connect().await.expect("test database is usable") else {
        return;
    };
    let club = Uuid::now_v7();
    let mut undated = NewEvent::single(club, "Undated", date(2024, 6, 8));
    undated.start_date = None;
    let undated = db.seed_event(&undated).await.expect("seed succeeds");
    db.seed_event(&NewEvent::single(club, "Before", date(2024, 5, 8)))
        .await
        .expect("seed succeeds");

    let window = DateWindow::month(2024, 6).expect("valid month");
    let events = db
        .store
        .events_in_window(club, window)
        .await
        .expect("read succeeds");

    let ids: Vec<Uuid> = events.iter().map(|event| event.id).collect();
    assert_eq!(ids, vec![undated.id]);
}

#[test_log::test(tokio::test)]
async fn lead_time_columns_round_trip() {
    let Some(db) = TestDb::connect().await.expect("test database is usable") else {
        return;
    };
    let event = db
        .seed_event(
            &NewEvent::recurring(Uuid::now_v7(), "Training", date(2024, 6, 3), RepeatType::Weekly)
                .with_lead_time(LeadTime::new(2, LeadTimeUnit::Weeks)),
        )
        .await
        .expect("seed succeeds");

    let stored = db
        .store
        .event(event.id)
        .await
        .expect("read succeeds")
        .expect("event exists");

    assert_eq!(
        stored.lead_time().expect("valid lead time"),
        Some(LeadTime::new(2, LeadTimeUnit::Weeks))
    );
    assert_eq!(
        stored.invitation_send_at(date(2024, 6, 17)).expect("valid lead time"),
        date(2024, 6, 3).and_hms_opt(12, 0, 0)
    );
}
