use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::Notify;

use super::common::*;
use crate::session::identity::AdminToken;
use crate::workflows::moderation::domain::{ApplicationKey, ApplicationStatus};
use crate::workflows::moderation::queue::ModerationError;
use crate::workflows::moderation::store::ApplicationStoreError;

#[tokio::test]
async fn approving_a_pending_application_refreshes_the_listing() {
    let (queue, _) = build_queue(vec![
        pending("app-000001", "mara@rivermill.ca", "Rivermill Bakery"),
        pending("app-000002", "dev@millst.ca", "Mill St Curios"),
    ]);

    let outcome = queue
        .approve(
            &admin(),
            Some(ApplicationKey::Id("app-000001".to_string())),
        )
        .await
        .expect("approve succeeds");

    assert_eq!(outcome.application.status, ApplicationStatus::Approved);
    assert_eq!(outcome.applications.len(), 2);
    assert_eq!(
        outcome.applications[0].status,
        ApplicationStatus::Approved,
        "refreshed listing reflects the transition"
    );

    let still_pending: Vec<_> = queue
        .list_pending(&admin())
        .await
        .expect("listing")
        .collect();
    assert_eq!(still_pending.len(), 1);
    assert_eq!(still_pending[0].id.as_deref(), Some("app-000002"));
}

#[tokio::test]
async fn rejecting_by_email_removes_it_from_pending() {
    let (queue, _) = build_queue(vec![{
        let mut record = pending("", "a@b.com", "Corner Shop");
        record.id = None;
        record
    }]);

    queue
        .reject(&admin(), Some(ApplicationKey::Email("a@b.com".to_string())))
        .await
        .expect("reject succeeds");

    let remaining: Vec<_> = queue
        .list_pending(&admin())
        .await
        .expect("listing")
        .collect();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn resolved_applications_cannot_be_moderated_again() {
    let (queue, store) = build_queue(vec![pending(
        "app-000001",
        "mara@rivermill.ca",
        "Rivermill Bakery",
    )]);
    let key = ApplicationKey::Id("app-000001".to_string());

    queue
        .approve(&admin(), Some(key.clone()))
        .await
        .expect("first approval");

    match queue.reject(&admin(), Some(key.clone())).await {
        Err(ModerationError::Store(ApplicationStoreError::NotPending {
            status: ApplicationStatus::Approved,
        })) => {}
        other => panic!("expected not-pending rejection, got {other:?}"),
    }
    assert_eq!(store.status_of(&key), Some(ApplicationStatus::Approved));
}

#[tokio::test]
async fn keyless_actions_fail_before_any_store_call() {
    let (queue, store) = build_queue(vec![pending(
        "app-000001",
        "mara@rivermill.ca",
        "Rivermill Bakery",
    )]);

    match queue.approve(&admin(), None).await {
        Err(ModerationError::MissingKey) => {}
        other => panic!("expected missing key, got {other:?}"),
    }
    assert_eq!(store.set_calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn second_action_is_busy_while_one_is_in_flight() {
    let (queue, store) = build_queue(vec![
        pending("app-000001", "mara@rivermill.ca", "Rivermill Bakery"),
        pending("app-000002", "dev@millst.ca", "Mill St Curios"),
    ]);

    let gate = Arc::new(Notify::new());
    store.hold_next_set_status(gate.clone());

    let first = {
        let queue = queue.clone();
        tokio::spawn(async move {
            queue
                .approve(
                    &admin(),
                    Some(ApplicationKey::Id("app-000001".to_string())),
                )
                .await
        })
    };
    tokio::task::yield_now().await;

    match queue
        .reject(
            &admin(),
            Some(ApplicationKey::Id("app-000002".to_string())),
        )
        .await
    {
        Err(ModerationError::Busy) => {}
        other => panic!("expected busy rejection, got {other:?}"),
    }

    gate.notify_one();
    let outcome = first
        .await
        .expect("task joins")
        .expect("in-flight action resolves");
    assert_eq!(outcome.application.status, ApplicationStatus::Approved);

    // Once the first action resolved the queue accepts the next one.
    queue
        .reject(
            &admin(),
            Some(ApplicationKey::Id("app-000002".to_string())),
        )
        .await
        .expect("action after resolution");
}

#[tokio::test]
async fn queue_releases_after_a_failed_action() {
    let (queue, _) = build_queue(vec![pending(
        "app-000001",
        "mara@rivermill.ca",
        "Rivermill Bakery",
    )]);

    match queue
        .approve(&admin(), Some(ApplicationKey::Id("ghost".to_string())))
        .await
    {
        Err(ModerationError::Store(ApplicationStoreError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }

    queue
        .approve(
            &admin(),
            Some(ApplicationKey::Id("app-000001".to_string())),
        )
        .await
        .expect("queue is free again after the failure");
}

#[tokio::test]
async fn rejected_admin_credential_propagates() {
    let (queue, _) = build_queue(vec![pending(
        "app-000001",
        "mara@rivermill.ca",
        "Rivermill Bakery",
    )]);

    match queue
        .approve(
            &AdminToken("stale-token".to_string()),
            Some(ApplicationKey::Id("app-000001".to_string())),
        )
        .await
    {
        Err(ModerationError::Store(ApplicationStoreError::Unauthorized)) => {}
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn every_listing_call_is_a_fresh_fetch() {
    let (queue, store) = build_queue(vec![pending(
        "app-000001",
        "mara@rivermill.ca",
        "Rivermill Bakery",
    )]);

    let _ = queue.list_pending(&admin()).await.expect("first listing");
    let _ = queue.list_pending(&admin()).await.expect("second listing");
    assert_eq!(store.list_calls.load(Ordering::SeqCst), 2);
}
