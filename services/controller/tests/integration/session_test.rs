//! Login, logout, session cookies and password changes.

use axum::http::StatusCode;
use axum_test::TestServer;

use deskpool_controller::router::build_router;
use deskpool_controller::usecase::session::{SESSION_COOKIE, sign_session_id};

use crate::helpers::test_state;

fn credentials(username: &str, password: &str) -> serde_json::Value {
    serde_json::json!({"username": username, "password": password})
}

#[tokio::test]
async fn should_login_and_set_a_session_cookie() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server.post("/login").json(&credentials("alice", "hunter2")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["role"], "standard");
    assert_eq!(body["first_login"], false);
    assert!(!response.cookie(SESSION_COOKIE).value().is_empty());
}

#[tokio::test]
async fn should_report_first_login_so_the_ui_can_force_a_change() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server.post("/login").json(&credentials("newbie", "changeme")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["first_login"], true);
}

#[tokio::test]
async fn should_reject_wrong_credentials() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    server
        .post("/login")
        .json(&credentials("alice", "wrong"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/login")
        .json(&credentials("ghost", "hunter2"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_invalidate_the_session_on_logout() {
    let (state, _dir) = test_state(Vec::new(), None);
    let mut server = TestServer::new(build_router(state)).unwrap();
    server.save_cookies();

    server
        .post("/login")
        .json(&credentials("alice", "hunter2"))
        .await
        .assert_status_ok();
    server.get("/api/agents").await.assert_status_ok();

    server.get("/logout").await.assert_status_ok();
    server.get("/api/agents").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_a_tampered_session_cookie() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server
        .get("/api/agents")
        .add_cookie(axum_extra::extract::cookie::Cookie::new(
            SESSION_COOKIE,
            "forged-id.deadbeef",
        ))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_a_well_signed_cookie_for_an_unknown_session() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    // Correct signature, but the id was never issued (e.g. restart wiped
    // the session map).
    let value = sign_session_id(crate::helpers::TEST_SECRET, "never-issued-id");
    let response = server
        .get("/api/agents")
        .add_cookie(axum_extra::extract::cookie::Cookie::new(SESSION_COOKIE, value))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_change_password_only_with_the_old_one() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    server
        .post("/change_password")
        .json(&serde_json::json!({
            "username": "alice",
            "old_password": "wrong",
            "new_password": "brand-new",
        }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/change_password")
        .json(&serde_json::json!({
            "username": "alice",
            "old_password": "hunter2",
            "new_password": "brand-new",
        }))
        .await
        .assert_status_ok();

    // Old password is dead, new one works.
    server
        .post("/login")
        .json(&credentials("alice", "hunter2"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/login")
        .json(&credentials("alice", "brand-new"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn should_clear_first_login_after_a_password_change() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    server
        .post("/change_password")
        .json(&serde_json::json!({
            "username": "newbie",
            "old_password": "changeme",
            "new_password": "my-own-pw",
        }))
        .await
        .assert_status_ok();

    let response = server.post("/login").json(&credentials("newbie", "my-own-pw")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["first_login"], false);
}

#[tokio::test]
async fn should_reject_empty_new_passwords() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    server
        .post("/change_password")
        .json(&serde_json::json!({
            "username": "alice",
            "old_password": "hunter2",
            "new_password": "  ",
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
