//! Idempotence, concurrency and read-side exclusion of the invitation ledger.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use rally_test::component::db::model::event::NewEvent;
use rally_test::component::db::model::invitation::NewInvitation;
use rally_test::component::db::store::{EventStore, InvitationStore, MemoryStore};
use rally_test::component::invitation::{
    materialize, materialize_event, materialize_for_user, respond, visible_invitations_for_user,
};
use rally_test::component::recur::{Cadence, RecurrenceRule};
use rally_test::component::schedule::{cancel_occurrence, end_series};
use rally_test::component::types::{InvitationStatus, RepeatType};
use rally_test::component::window::DateWindow;

use super::helpers::date;

fn five_weeks() -> DateWindow {
    DateWindow::new(date(2024, 6, 3), date(2024, 7, 7)).expect("valid window")
}

#[test_log::test(tokio::test)]
async fn second_pass_inserts_nothing() {
    let store = MemoryStore::new();
    let rule = RecurrenceRule::new(date(2024, 6, 3), Cadence::Weekly);
    let (event_id, user_id) = (Uuid::now_v7(), Uuid::now_v7());

    let first = materialize_for_user(&store, &rule, event_id, user_id, &five_weeks())
        .await
        .expect("read succeeds");
    let second = materialize_for_user(&store, &rule, event_id, user_id, &five_weeks())
        .await
        .expect("read succeeds");

    assert_eq!(first.created.len(), 5);
    assert!(second.created.is_empty());
    assert!(second.already_present.is_empty());
    assert_eq!(store.invitations().len(), 5);
}

#[test_log::test(tokio::test)]
async fn stale_existing_set_reports_already_present() {
    let store = MemoryStore::new();
    let rule = RecurrenceRule::new(date(2024, 6, 3), Cadence::Weekly);
    let (event_id, user_id) = (Uuid::now_v7(), Uuid::now_v7());
    store
        .insert_pending(NewInvitation::pending(event_id, user_id, date(2024, 6, 10)))
        .await
        .expect("insert succeeds");

    // The caller read its existing dates before the other writer ran
    let report = materialize(
        &store,
        &rule,
        event_id,
        user_id,
        &BTreeSet::new(),
        &five_weeks(),
    )
    .await;

    assert_eq!(report.already_present, vec![date(2024, 6, 10)]);
    assert_eq!(report.created.len(), 4);
    assert!(report.succeeded());
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_passes_converge_on_one_record_per_date() {
    let store = Arc::new(MemoryStore::new());
    let rule = RecurrenceRule::new(date(2024, 6, 1), Cadence::Daily);
    let (event_id, user_id) = (Uuid::now_v7(), Uuid::now_v7());
    let window = DateWindow::month(2024, 6).expect("valid month");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            let rule = rule.clone();
            tokio::spawn(async move {
                let existing = BTreeSet::new();
                materialize(&*store, &rule, event_id, user_id, &existing, &window).await
            })
        })
        .collect();

    let mut created = 0;
    let mut already_present = 0;
    for task in tasks {
        let report = task.await.expect("task completes");
        assert!(report.succeeded());
        created += report.created.len();
        already_present += report.already_present.len();
    }

    assert_eq!(created, 30);
    assert_eq!(already_present, 8 * 30 - 30);
    let keys: BTreeSet<_> = store
        .invitations()
        .iter()
        .map(|record| (record.event_id, record.user_id, record.occurrence_date))
        .collect();
    assert_eq!(keys.len(), 30);
    assert_eq!(store.invitations().len(), 30);
}

#[test_log::test(tokio::test)]
async fn event_materialization_covers_every_invitee() {
    let store = MemoryStore::new();
    let club = Uuid::now_v7();
    let event = store.insert_event(NewEvent::recurring(
        club,
        "Training",
        date(2024, 6, 3),
        RepeatType::Weekly,
    ));
    let users = [Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];
    for user in users {
        store
            .insert_pending(NewInvitation::pending(event.id, user, date(2024, 6, 3)))
            .await
            .expect("insert succeeds");
    }

    let result = materialize_event(&store, &event, &five_weeks())
        .await
        .expect("event is valid");

    assert_eq!(result.reports.len(), 3);
    assert!(result.failures.is_empty());
    // 06-10, 06-17, 06-24, 07-01 for each user
    assert_eq!(result.created_count(), 12);
    assert_eq!(store.invitations().len(), 15);
}

#[test_log::test(tokio::test)]
async fn cancelled_occurrence_is_hidden_but_kept() {
    let store = MemoryStore::new();
    let event = store.insert_event(NewEvent::recurring(
        Uuid::now_v7(),
        "Training",
        date(2024, 6, 3),
        RepeatType::Weekly,
    ));
    let user_id = Uuid::now_v7();
    let rule = event.recurrence_rule().expect("valid rule");
    materialize_for_user(&store, &rule, event.id, user_id, &five_weeks())
        .await
        .expect("read succeeds");

    cancel_occurrence(&store, event.id, date(2024, 6, 17))
        .await
        .expect("date is an occurrence");

    let visible = visible_invitations_for_user(&store, user_id, five_weeks())
        .await
        .expect("reads succeed");
    let dates: Vec<_> = visible.iter().map(|record| record.occurrence_date).collect();

    assert_eq!(
        dates,
        vec![
            date(2024, 6, 3),
            date(2024, 6, 10),
            date(2024, 6, 24),
            date(2024, 7, 1)
        ]
    );
    assert_eq!(store.invitations().len(), 5);

    // Re-materializing the edited rule adds nothing for the cancelled date
    let edited = store
        .event(event.id)
        .await
        .expect("read succeeds")
        .expect("event exists")
        .recurrence_rule()
        .expect("valid rule");
    let again = materialize_for_user(&store, &edited, event.id, user_id, &five_weeks())
        .await
        .expect("read succeeds");
    assert!(again.created.is_empty());
}

#[test_log::test(tokio::test)]
async fn ended_series_hides_future_answers() {
    let store = MemoryStore::new();
    let event = store.insert_event(NewEvent::recurring(
        Uuid::now_v7(),
        "Training",
        date(2024, 6, 3),
        RepeatType::Weekly,
    ));
    let user_id = Uuid::now_v7();
    let rule = event.recurrence_rule().expect("valid rule");
    materialize_for_user(&store, &rule, event.id, user_id, &five_weeks())
        .await
        .expect("read succeeds");

    let answered = respond(
        &store,
        event.id,
        user_id,
        date(2024, 6, 24),
        InvitationStatus::Accepted,
        Utc::now(),
    )
    .await
    .expect("invitation exists");
    assert_eq!(answered.status(), InvitationStatus::Accepted);
    assert!(answered.responded_at.is_some());

    let ended = end_series(&store, event.id, date(2024, 6, 17))
        .await
        .expect("event exists");
    assert_eq!(ended.repeat_end_date, Some(date(2024, 6, 16)));

    let visible = visible_invitations_for_user(&store, user_id, five_weeks())
        .await
        .expect("reads succeed");
    assert_eq!(visible.len(), 2);
    assert!(
        store
            .invitations()
            .iter()
            .any(|record| record.status() == InvitationStatus::Accepted)
    );
}
