//! Store failures are contained and reported, never silently dropped.

use chrono::Utc;
use uuid::Uuid;

use rally_test::component::db::model::event::NewEvent;
use rally_test::component::db::model::invitation::NewInvitation;
use rally_test::component::db::store::InvitationStore;
use rally_test::component::invitation::{materialize_event, materialize_for_user};
use rally_test::component::recur::{Cadence, RecurrenceRule};
use rally_test::component::types::RepeatType;
use rally_test::component::window::DateWindow;

use super::helpers::{FlakyStore, date};

fn five_weeks() -> DateWindow {
    DateWindow::new(date(2024, 6, 3), date(2024, 7, 7)).expect("valid window")
}

#[test_log::test(tokio::test)]
async fn failed_insert_does_not_stop_later_dates() {
    let store = FlakyStore::new();
    store.fail_inserts_on(date(2024, 6, 10));
    let rule = RecurrenceRule::new(date(2024, 6, 3), Cadence::Weekly);
    let (event_id, user_id) = (Uuid::now_v7(), Uuid::now_v7());

    let report = materialize_for_user(&store, &rule, event_id, user_id, &five_weeks())
        .await
        .expect("read succeeds");

    assert!(!report.succeeded());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.failed[0].date, date(2024, 6, 10));
    assert!(report.failed[0].retryable);
    assert_eq!(
        report.created,
        vec![
            date(2024, 6, 3),
            date(2024, 6, 17),
            date(2024, 6, 24),
            date(2024, 7, 1)
        ]
    );
    assert_eq!(store.inner.invitations().len(), 4);
}

#[test_log::test(tokio::test)]
async fn unreadable_existing_dates_abort_without_writes() {
    let store = FlakyStore::new();
    let user_id = Uuid::now_v7();
    store.fail_reads_for(user_id);
    let rule = RecurrenceRule::new(date(2024, 6, 3), Cadence::Daily);

    let err = materialize_for_user(&store, &rule, Uuid::now_v7(), user_id, &five_weeks())
        .await
        .expect_err("read fails");

    assert!(err.is_retryable());
    assert!(store.inner.invitations().is_empty());
}

#[test_log::test(tokio::test)]
async fn retry_after_partial_failure_fills_the_gap() {
    let store = FlakyStore::new();
    store.fail_inserts_on(date(2024, 6, 17));
    let rule = RecurrenceRule::new(date(2024, 6, 3), Cadence::Weekly);
    let (event_id, user_id) = (Uuid::now_v7(), Uuid::now_v7());

    materialize_for_user(&store, &rule, event_id, user_id, &five_weeks())
        .await
        .expect("read succeeds");

    let healthy = &store.inner;
    let retry = materialize_for_user(healthy, &rule, event_id, user_id, &five_weeks())
        .await
        .expect("read succeeds");

    assert_eq!(retry.created, vec![date(2024, 6, 17)]);
    assert_eq!(healthy.invitations().len(), 5);
}

#[test_log::test(tokio::test)]
async fn one_failing_invitee_does_not_block_the_others() {
    let store = FlakyStore::new();
    let event = store.inner.insert_event(NewEvent::recurring(
        Uuid::now_v7(),
        "Training",
        date(2024, 6, 3),
        RepeatType::Weekly,
    ));
    let (healthy, broken) = (Uuid::now_v7(), Uuid::now_v7());
    for user in [healthy, broken] {
        store
            .insert_pending(NewInvitation::pending(event.id, user, date(2024, 6, 3)))
            .await
            .expect("insert succeeds");
    }
    store.fail_reads_for(broken);

    let result = materialize_event(&store, &event, &five_weeks())
        .await
        .expect("event is valid");

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].user_id, broken);
    assert!(result.failures[0].retryable);
    assert_eq!(result.reports.len(), 1);
    assert_eq!(result.reports[0].user_id, healthy);
    assert_eq!(result.created_count(), 4);
}

#[test_log::test(tokio::test)]
async fn malformed_event_is_rejected_before_any_write() {
    let store = FlakyStore::new();
    let mut event = NewEvent::recurring(Uuid::now_v7(), "Odd", date(2024, 6, 3), RepeatType::Weekly)
        .into_event(Utc::now());
    event.repeat_type = Some("fortnightly-ish".into());

    assert!(materialize_event(&store, &event, &five_weeks()).await.is_err());
    assert!(store.inner.invitations().is_empty());
}
