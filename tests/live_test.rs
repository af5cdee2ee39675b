//! Change notices and scoped snapshots for live views.
mod common;

use common::{file, setup};
use tokio::sync::mpsc;

use assignpro_backend::error::AppError;
use assignpro_backend::live::snapshot::snapshot;
use assignpro_backend::live::{ChangeNotice, Collection, Scope};
use assignpro_backend::models::Decision;
use assignpro_backend::models::profiles::UpdateProfile;
use assignpro_backend::models::submissions::{ReviewSubmissionCommand, SubmitWork};

#[tokio::test]
async fn committed_submissions_notify_owner_and_admins_only() {
    let app = setup().await;
    let ali = app.approved_worker("ali@example.com").await;
    let sara = app.approved_worker("sara@example.com").await;
    let assignment = app.publish("Essay", 50.0).await;

    let hub = app.workflow.live();
    let (ali_tx, mut ali_rx) = mpsc::unbounded_channel();
    let (admin_tx, mut admin_rx) = mpsc::unbounded_channel();
    hub.subscribe(Collection::Submissions, Scope::Worker(ali.id), ali_tx)
        .await;
    hub.subscribe(Collection::Submissions, Scope::All, admin_tx)
        .await;

    app.workflow
        .submit(
            &sara,
            SubmitWork {
                assignment_id: assignment.id,
                file: file("sara.pdf"),
            },
        )
        .await
        .unwrap();

    assert!(ali_rx.try_recv().is_err());
    assert_eq!(
        admin_rx.try_recv().unwrap(),
        ChangeNotice {
            collection: Collection::Submissions
        }
    );

    app.workflow
        .submit(
            &ali,
            SubmitWork {
                assignment_id: assignment.id,
                file: file("ali.pdf"),
            },
        )
        .await
        .unwrap();

    assert!(ali_rx.try_recv().is_ok());
    assert!(admin_rx.try_recv().is_ok());
}

#[tokio::test]
async fn publishing_an_assignment_reaches_every_worker() {
    let app = setup().await;
    let ali = app.approved_worker("ali@example.com").await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    app.workflow
        .live()
        .subscribe(Collection::Assignments, Scope::Worker(ali.id), tx)
        .await;

    app.publish("Essay", 50.0).await;

    assert!(rx.try_recv().is_ok());
}

#[tokio::test]
async fn submit_and_review_refresh_the_workers_assignment_view() {
    let app = setup().await;
    let ali = app.approved_worker("ali@example.com").await;
    let sara = app.approved_worker("sara@example.com").await;
    let assignment = app.publish("Essay", 50.0).await;

    let hub = app.workflow.live();
    let (ali_tx, mut ali_rx) = mpsc::unbounded_channel();
    let (sara_tx, mut sara_rx) = mpsc::unbounded_channel();
    hub.subscribe(Collection::Assignments, Scope::Worker(ali.id), ali_tx)
        .await;
    hub.subscribe(Collection::Assignments, Scope::Worker(sara.id), sara_tx)
        .await;

    let submission = app
        .workflow
        .submit(
            &ali,
            SubmitWork {
                assignment_id: assignment.id,
                file: file("ali.pdf"),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        ali_rx.try_recv().unwrap(),
        ChangeNotice {
            collection: Collection::Assignments
        }
    );

    app.workflow
        .review(
            &app.admin,
            submission.id,
            ReviewSubmissionCommand {
                decision: Decision::Approve,
            },
        )
        .await
        .unwrap();
    assert!(ali_rx.try_recv().is_ok());

    // Another worker's status is not part of Sara's view.
    assert!(sara_rx.try_recv().is_err());

    let view = snapshot(&app.workflow, &ali, Collection::Assignments)
        .await
        .unwrap();
    assert_eq!(view[0]["my_status"], "approved");
}

#[tokio::test]
async fn renaming_a_worker_refreshes_views_showing_the_name() {
    let app = setup().await;
    let ali = app.approved_worker("ali@example.com").await;

    let hub = app.workflow.live();
    let (tx, mut rx) = mpsc::unbounded_channel();
    for collection in [Collection::Submissions, Collection::Withdrawals] {
        hub.subscribe(collection, Scope::All, tx.clone()).await;
    }

    app.workflow
        .update_profile(
            &ali,
            UpdateProfile {
                full_name: Some("Ali Raza".to_string()),
                phone: None,
                father_name: None,
                city: None,
                qualification: None,
                job: None,
            },
        )
        .await
        .unwrap();

    let seen = vec![rx.try_recv().unwrap(), rx.try_recv().unwrap()];
    assert_eq!(
        seen,
        vec![
            ChangeNotice {
                collection: Collection::Submissions
            },
            ChangeNotice {
                collection: Collection::Withdrawals
            },
        ]
    );
}

#[tokio::test]
async fn snapshots_are_scoped_to_the_viewer() {
    let app = setup().await;
    let ali = app.approved_worker("ali@example.com").await;
    let sara = app.approved_worker("sara@example.com").await;
    let assignment = app.publish("Essay", 50.0).await;
    for worker in [&ali, &sara] {
        app.workflow
            .submit(
                worker,
                SubmitWork {
                    assignment_id: assignment.id,
                    file: file("work.pdf"),
                },
            )
            .await
            .unwrap();
    }

    let mine = snapshot(&app.workflow, &ali, Collection::Submissions)
        .await
        .unwrap();
    let all = snapshot(&app.workflow, &app.admin, Collection::Submissions)
        .await
        .unwrap();

    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["worker_id"], ali.id.to_string());
    assert_eq!(all.as_array().unwrap().len(), 2);

    let assignments = snapshot(&app.workflow, &ali, Collection::Assignments)
        .await
        .unwrap();
    assert_eq!(assignments[0]["my_status"], "pending");
}

#[tokio::test]
async fn workers_cannot_snapshot_users() {
    let app = setup().await;
    let ali = app.approved_worker("ali@example.com").await;

    let err = snapshot(&app.workflow, &ali, Collection::Users)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let users = snapshot(&app.workflow, &app.admin, Collection::Users)
        .await
        .unwrap();
    // Admin plus the worker.
    assert_eq!(users.as_array().unwrap().len(), 2);
}
