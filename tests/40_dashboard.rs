mod common;

use anyhow::Result;
use common::Harness;
use useradmin::dashboard::{Dashboard, DashboardState};
use useradmin::guard::{Navigation, Route};
use useradmin::records::{DeleteOutcome, UserDraft};
use useradmin::ErrorKind;

async fn open(h: &Harness) -> Dashboard {
    Dashboard::open(h.records.clone())
        .await
        .into_view()
        .expect("dashboard should render for a logged-in user")
}

#[tokio::test]
async fn dashboard_redirects_without_session() -> Result<()> {
    let h = Harness::start().await?;

    let nav = Dashboard::open(h.records.clone()).await;
    assert!(matches!(nav, Navigation::Redirect(Route::Login)));
    assert!(h.backend.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn mount_loads_records_and_becomes_ready() -> Result<()> {
    let h = Harness::logged_in().await?;
    h.backend.seed_user("A", "a@b.com", "secret1");

    let dashboard = open(&h).await;
    assert_eq!(dashboard.state(), &DashboardState::Ready);
    assert_eq!(dashboard.user().name, "A");
    assert_eq!(dashboard.users().len(), 1);
    assert_eq!(dashboard.notice(), None);
    Ok(())
}

#[tokio::test]
async fn add_dialog_submit_reloads_and_closes() -> Result<()> {
    let h = Harness::logged_in().await?;
    let mut dashboard = open(&h).await;
    assert!(dashboard.users().is_empty());

    assert!(dashboard.open_add());
    assert_eq!(dashboard.state(), &DashboardState::AddDialogOpen(UserDraft::default()));
    *dashboard.draft_mut().unwrap() = UserDraft::new("Bob", "bob@example.com", "secret99");

    dashboard.submit().await?;
    assert_eq!(dashboard.state(), &DashboardState::Ready);
    assert_eq!(dashboard.users().len(), 1);
    assert_eq!(dashboard.users()[0].name, "Bob");

    // mount fetch, create, re-fetch
    let methods: Vec<_> = h.backend.requests_to("/v1/users").into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["GET", "POST", "GET"]);
    Ok(())
}

#[tokio::test]
async fn failed_submit_keeps_dialog_and_draft() -> Result<()> {
    let h = Harness::logged_in().await?;
    let mut dashboard = open(&h).await;

    dashboard.open_add();
    *dashboard.draft_mut().unwrap() = UserDraft::new("Bob", "bob@example.com", "123");

    let err = dashboard.submit().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        dashboard.state(),
        &DashboardState::AddDialogOpen(UserDraft::new("Bob", "bob@example.com", "123"))
    );
    assert!(dashboard.notice().is_some());

    dashboard.cancel();
    assert_eq!(dashboard.state(), &DashboardState::Ready);
    assert!(dashboard.draft_mut().is_none());
    Ok(())
}

#[tokio::test]
async fn rejected_submit_redirects_once_without_reloading() -> Result<()> {
    let h = Harness::logged_in().await?;
    let mut dashboard = open(&h).await;

    dashboard.open_add();
    *dashboard.draft_mut().unwrap() = UserDraft::new("Bob", "bob@example.com", "secret99");
    h.backend.set_force_unauthorized(true);

    let err = dashboard.submit().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(h.navigator.redirects(), vec![Route::Login]);
    assert_eq!(h.session.current_user(), None);

    // mount fetch and the rejected create, no reload after it
    let methods: Vec<_> = h.backend.requests_to("/v1/users").into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["GET", "POST"]);
    Ok(())
}

#[tokio::test]
async fn edit_dialog_is_prefilled_with_blank_password() -> Result<()> {
    let h = Harness::logged_in().await?;
    let id = h.backend.seed_user("Bob", "bob@example.com", "original1");
    let mut dashboard = open(&h).await;

    let bob = dashboard.users()[0].clone();
    assert!(dashboard.open_edit(&bob));
    assert!(!dashboard.open_add(), "dialogs do not stack");

    let draft = dashboard.draft_mut().unwrap();
    assert_eq!(draft, &mut UserDraft::new("Bob", "bob@example.com", ""));
    draft.name = "Robert".into();

    dashboard.submit().await?;
    assert_eq!(dashboard.state(), &DashboardState::Ready);
    assert_eq!(dashboard.users()[0].name, "Robert");
    assert_eq!(h.backend.password_of(id).as_deref(), Some("original1"));
    Ok(())
}

#[tokio::test]
async fn delete_reloads_after_confirmation() -> Result<()> {
    let h = Harness::logged_in().await?;
    let id = h.backend.seed_user("Bob", "bob@example.com", "secret99");
    let mut dashboard = open(&h).await;

    let outcome = dashboard.delete(id, &|_: &str| false).await?;
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(dashboard.users().len(), 1);

    let outcome = dashboard.delete(id, &|_: &str| true).await?;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(dashboard.users().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_reload_leaves_empty_list_and_notice() -> Result<()> {
    let h = Harness::logged_in().await?;
    h.backend.seed_user("Bob", "bob@example.com", "secret99");
    let mut dashboard = open(&h).await;
    assert_eq!(dashboard.users().len(), 1);

    h.backend.fail_users_with(500, serde_json::json!({"message": "Database down"}));
    dashboard.mount().await;

    assert_eq!(dashboard.state(), &DashboardState::Ready);
    assert!(dashboard.users().is_empty());
    assert_eq!(dashboard.notice(), Some("Database down"));
    Ok(())
}

#[tokio::test]
async fn logout_requires_confirmation() -> Result<()> {
    let h = Harness::logged_in().await?;
    let mut dashboard = open(&h).await;

    assert!(!dashboard.logout(&|_: &str| false));
    assert!(h.session.current_user().is_some());

    assert!(dashboard.logout(&|_: &str| true));
    assert_eq!(h.session.current_user(), None);
    assert_eq!(h.navigator.redirects(), vec![Route::Login]);
    Ok(())
}
