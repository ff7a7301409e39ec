//! View behaviour against a mock backend: reconcile-after-mutation, bulk
//! partial failure, and card binding from the users page.

use std::time::Duration;

use assert_matches::assert_matches;
use doorctl_binding::BindingConfig;
use doorctl_client::{AdminApi, ApiError, ClientConfig};
use doorctl_console::{
    AdminsView, CardsView, DoorView, LoadState, LogsView, NoticeLevel, SessionView, UsersView,
    ViewError,
};
use doorctl_core::models::{LockMode, NewAdmin, NewUser};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> AdminApi {
    AdminApi::new(&ClientConfig::new(server.uri())).expect("client should build")
}

fn users_body(card_count_of_first: u32) -> serde_json::Value {
    json!([
        {"id": "u1", "student_id": "S12345", "name": "Ada Lovelace",
         "email": "ada@example.com", "is_active": true, "card_count": card_count_of_first},
        {"id": "u2", "student_id": "S67890", "name": "Lin Mei",
         "telegram_id": "@linmei", "is_active": true, "card_count": 0}
    ])
}

async fn mount_users(server: &MockServer, expected_loads: u64) {
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_body(1)))
        .expect(expected_loads)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[tokio::test]
async fn users_load_and_filter() {
    let server = MockServer::start().await;
    mount_users(&server, 1).await;

    let mut view = UsersView::new(api_for(&server));
    assert_eq!(view.load().await.unwrap(), 2);

    assert_eq!(view.filter("ada@").len(), 1);
    assert_eq!(view.filter("@LINMEI")[0].id, "u2");
    assert_eq!(view.filter("s6789")[0].name, "Lin Mei");
    assert_eq!(view.filter(" ").len(), 2);
    assert!(view.filter("nobody").is_empty());
    assert_eq!(view.get("u1").unwrap().student_id, "S12345");
    assert_matches!(view.get("u9"), Err(ViewError::Invalid(_)));
}

#[tokio::test]
async fn failed_load_offers_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/cards"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Database offline"})))
        .mount(&server)
        .await;

    let mut view = CardsView::new(api_for(&server));
    assert!(view.load().await.is_err());
    assert_eq!(
        view.list().state(),
        &LoadState::Failed {
            detail: "Database offline".into()
        }
    );
}

#[tokio::test]
async fn failed_create_leaves_list_unchanged() {
    let server = MockServer::start().await;
    mount_users(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Student ID already in use"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = UsersView::new(api_for(&server));
    view.load().await.unwrap();
    let before = view.list().items().to_vec();

    let err = view
        .create(NewUser {
            student_id: "S12345".into(),
            name: "Ada Again".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    let notice = err.notice("Add user");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Student ID already in use");
    assert_eq!(view.list().items(), before.as_slice());
}

#[tokio::test]
async fn invalid_input_is_rejected_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut view = UsersView::new(api_for(&server));
    let err = view
        .create(NewUser {
            student_id: "S1".into(),
            name: "Ada".into(),
            email: Some("not-an-email".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, ViewError::Invalid(_));
}

#[tokio::test]
async fn successful_create_reloads() {
    let server = MockServer::start().await;
    mount_users(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/admin/users"))
        .and(body_string_contains("S24680"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "User created"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = UsersView::new(api_for(&server));
    let notice = view
        .create(NewUser {
            student_id: "S24680".into(),
            name: "Grace Hopper".into(),
            email: Some("  ".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(notice.message, "User created");
    assert!(view.list().is_loaded());

    let requests = server.received_requests().await.unwrap();
    let create = requests.iter().find(|r| r.method.as_str() == "POST").unwrap();
    assert!(!String::from_utf8_lossy(&create.body).contains("name=\"email\""));
}

#[tokio::test]
async fn accepted_create_survives_failed_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "User created"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "db busy"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = UsersView::new(api_for(&server));
    let notice = view
        .create(NewUser {
            student_id: "S24680".into(),
            name: "Grace Hopper".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "User created");
    assert_eq!(
        view.list().state(),
        &LoadState::Failed {
            detail: "db busy".into()
        }
    );
}

#[tokio::test]
async fn bulk_card_delete_reports_outcome_when_refresh_fails() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/cards/c1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/cards"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = CardsView::new(api_for(&server));
    let outcome = view.delete_many(&["c1".to_string()]).await.unwrap();

    assert!(outcome.is_complete_success());
    assert_matches!(view.list().state(), LoadState::Failed { .. });
}

#[tokio::test]
async fn bulk_disable_reports_partial_failure() {
    let server = MockServer::start().await;
    mount_users(&server, 2).await;
    Mock::given(method("PUT"))
        .and(path("/admin/users/u1"))
        .and(body_string_contains("false"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/users/u2"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "User not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = UsersView::new(api_for(&server));
    view.load().await.unwrap();

    let ids = vec!["u1".to_string(), "u2".to_string(), "ghost".to_string()];
    let outcome = view.set_active_many(&ids, false).await.unwrap();

    assert_eq!(outcome.success_count(), 1);
    assert_eq!(outcome.failure_count(), 2);
    let failed: Vec<_> = outcome.failed().map(|(id, msg)| (id.as_str(), msg)).collect();
    assert!(failed.contains(&("u2", "User not found")));
    assert!(failed.iter().any(|(id, _)| *id == "ghost"));
}

#[tokio::test]
async fn expired_session_stops_bulk_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/admins/a1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/admin/admins/a2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let mut view = AdminsView::new(api.clone());
    let err = view
        .delete_many(&["a1".to_string(), "a2".to_string()])
        .await
        .unwrap_err();

    assert!(err.is_auth_expired());
    assert!(api.auth_signal().is_expired());
}

// ---------------------------------------------------------------------------
// Binding from the users page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bind_new_card_reloads_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_body(1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_body(2)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mode/register"))
        .and(body_string_contains("nickname=wristband"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Scan the card"})))
        .expect(1)
        .mount(&server)
        .await;
    // Still "in progress" but the count moved past the user's baseline of 1.
    Mock::given(method("GET"))
        .and(path("/check_status/S12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bound": true, "binding_in_progress": true, "card_count": 2
        })))
        .mount(&server)
        .await;

    let config = BindingConfig {
        poll_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let mut view = UsersView::with_binding_config(api_for(&server), config);
    view.load().await.unwrap();

    let notice = tokio::time::timeout(
        Duration::from_secs(5),
        view.bind_new_card("S12345", Some("wristband")),
    )
    .await
    .expect("binding should finish")
    .unwrap()
    .expect("bound sessions produce a notice");

    assert_eq!(notice.level, NoticeLevel::Success);
    assert!(notice.message.contains('2'));
    assert_eq!(view.list().get("u1").unwrap().card_count, 2);

    assert!(view.dismiss_binding());
    assert!(!view.binding().snapshot().state.is_active());
}

#[tokio::test]
async fn bound_card_keeps_success_notice_when_refresh_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/users"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "db busy"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mode/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Scan the card"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/check_status/S12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bound": true, "binding_in_progress": false, "card_count": 2
        })))
        .mount(&server)
        .await;

    let config = BindingConfig {
        poll_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let mut view = UsersView::with_binding_config(api_for(&server), config);

    let notice = tokio::time::timeout(Duration::from_secs(5), view.bind_new_card("S12345", None))
        .await
        .expect("binding should finish")
        .unwrap()
        .expect("bound sessions produce a notice");

    assert_eq!(notice.level, NoticeLevel::Success);
    assert_matches!(view.list().state(), LoadState::Failed { .. });
}

#[tokio::test]
async fn binding_start_failure_is_a_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mode/register"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "User not found"})))
        .mount(&server)
        .await;

    let mut view = UsersView::new(api_for(&server));
    let notice = view
        .bind_new_card("S00000", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "User not found");
    assert!(notice.guidance.is_some());
}

// ---------------------------------------------------------------------------
// Other views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn card_rename_sends_nickname_only() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/cards/c1"))
        .and(body_string_contains("spare fob"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/cards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "rfid_uid": "04A1B2C3", "nickname": "spare fob", "user_id": "u1", "is_active": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = CardsView::new(api_for(&server));
    let notice = view.rename("c1", "  spare fob ").await.unwrap();
    assert_eq!(notice.message, "Card renamed");
    assert_eq!(view.filter("04a1").len(), 1);
}

#[tokio::test]
async fn admin_create_requires_password() {
    let server = MockServer::start().await;
    let mut view = AdminsView::new(api_for(&server));
    let err = view
        .create(NewAdmin {
            username: "guard".into(),
            password: String::new(),
            name: "Night Guard".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.notice("Add administrator").message, "Password is required");
}

#[tokio::test]
async fn logs_use_configured_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/logs"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "user_name": "Ada Lovelace", "student_id": "S12345",
             "rfid_uid": "04A1B2C3", "action": "entry", "timestamp": "2024-03-01 09:00:00"},
            {"id": 8, "rfid_uid": "FFFF", "action": "denied", "timestamp": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut view = LogsView::new(api_for(&server));
    assert_eq!(view.limit(), 50);
    view.set_limit(10);
    view.load().await.unwrap();

    assert_eq!(view.filter("entry").len(), 1);
    assert_eq!(view.filter("ffff")[0].id, "8");
}

#[tokio::test]
async fn door_rejects_unknown_mode_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/door/lock-mode"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut view = DoorView::new(api_for(&server));
    assert_matches!(view.set_mode(LockMode::Unknown).await, Err(ViewError::Invalid(_)));
}

#[tokio::test]
async fn door_status_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/door/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "locked": true, "lock_mode": "normal"
        })))
        .mount(&server)
        .await;

    let mut view = DoorView::new(api_for(&server));
    assert!(view.status().is_none());
    let status = view.refresh().await.unwrap();
    assert_eq!(status.lock_mode, Some(LockMode::Normal));
    assert_eq!(view.status().and_then(|s| s.locked), Some(true));
}

#[tokio::test]
async fn login_records_current_admin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "root", "name": "Site Admin"
        })))
        .mount(&server)
        .await;

    let mut view = SessionView::new(api_for(&server));
    let notice = view.login("root", "secret").await.unwrap();
    assert_eq!(notice.message, "Signed in as Site Admin");
    assert_eq!(view.current().and_then(|a| a.username.as_deref()), Some("root"));
}

#[tokio::test]
async fn bad_credentials_surface_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Wrong username or password"
        })))
        .mount(&server)
        .await;

    let mut view = SessionView::new(api_for(&server));
    let err = view.login("root", "nope").await.unwrap_err();
    assert_matches!(err, ViewError::Api(ApiError::Request { status: 401, .. }));
    assert!(!err.is_auth_expired());
    assert!(view.current().is_none());
}
