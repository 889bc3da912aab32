//! Full-loop placement tests: the controller router dispatching against
//! loopback fake agents.

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use axum_test::TestServer;

use deskpool_controller::router::build_router;
use deskpool_wire::execute::ExecuteResponse;

use crate::helpers::{capacity, launch_body, ok_reply, seed_agent, spawn_fake_agent, test_state};

#[tokio::test]
async fn should_place_on_the_highest_scoring_agent() {
    let (state, _dir) = test_state(Vec::new(), None);

    // worker-a: 7 free cores, 14 GiB free -> 16.8; worker-b: 4 + 8 GiB -> 9.6
    let (url_a, calls_a) = spawn_fake_agent(StatusCode::OK, ok_reply(40123)).await;
    let (url_b, calls_b) = spawn_fake_agent(StatusCode::OK, ok_reply(41000)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(8, 1.0, 16384, 2048)).await;
    seed_agent(&state, "worker-b", &url_b, capacity(4, 0.0, 8192, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 2, 4096, false))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["agent_id"], "worker-a");
    assert_eq!(body["rdp_port"], 40123);
    assert_eq!(body["rdp_host"], "10.0.0.5");
    assert!(
        body["message"].as_str().unwrap().contains("10.0.0.5:40123"),
        "human-readable message must carry the coordinates"
    );
    assert_eq!(calls_a.load(Ordering::SeqCst), 1);
    assert_eq!(calls_b.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_return_503_when_gpu_is_required_but_absent() {
    let (state, _dir) = test_state(Vec::new(), None);
    let (url_a, calls_a) = spawn_fake_agent(StatusCode::OK, ok_reply(40123)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(8, 1.0, 16384, 2048)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 2, 4096, true))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "NO_CANDIDATE");
    assert_eq!(calls_a.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_fall_over_to_the_next_agent_when_the_best_one_errors() {
    let (state, _dir) = test_state(Vec::new(), None);

    let (url_a, calls_a) = spawn_fake_agent(
        StatusCode::OK,
        ExecuteResponse::Error {
            error: "no rdp port available".to_owned(),
        },
    )
    .await;
    let (url_b, calls_b) = spawn_fake_agent(StatusCode::OK, ok_reply(41000)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(8, 1.0, 16384, 2048)).await;
    seed_agent(&state, "worker-b", &url_b, capacity(4, 0.0, 8192, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 2, 4096, false))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["agent_id"], "worker-b");
    // A's failure stays out of the success payload.
    assert!(!body.to_string().contains("no rdp port available"));
    assert_eq!(calls_a.load(Ordering::SeqCst), 1);
    assert_eq!(calls_b.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn should_enforce_role_quota_before_touching_any_agent() {
    let (state, _dir) = test_state(Vec::new(), None);
    let (url_a, calls_a) = spawn_fake_agent(StatusCode::OK, ok_reply(40123)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(16, 0.0, 65536, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    // alice is standard: max 4 CPU.
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 8, 4096, false))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "QUOTA_EXCEEDED");
    assert_eq!(calls_a.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_let_power_roles_use_their_larger_ceiling() {
    let (state, _dir) = test_state(Vec::new(), None);
    let (url_a, _) = spawn_fake_agent(StatusCode::OK, ok_reply(40123)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(16, 0.0, 65536, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("petra", "s3cure", 8, 16384, false))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn should_reject_bad_credentials_without_placement() {
    let (state, _dir) = test_state(Vec::new(), None);
    let (url_a, calls_a) = spawn_fake_agent(StatusCode::OK, ok_reply(40123)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(8, 0.0, 16384, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "not-her-password", 2, 4096, false))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(calls_a.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_name_the_missing_field_on_malformed_bodies() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server
        .post("/launch")
        .json(&serde_json::json!({"username": "alice", "password": "hunter2"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "missing field: image");
}

#[tokio::test]
async fn should_enforce_the_image_allowlist() {
    let (state, _dir) = test_state(vec!["desk/approved:1".to_owned()], None);
    let (url_a, calls_a) = spawn_fake_agent(StatusCode::OK, ok_reply(40123)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(8, 0.0, 16384, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 2, 4096, false))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "IMAGE_NOT_ALLOWED");
    assert_eq!(calls_a.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn should_return_502_with_diagnostics_when_every_candidate_fails() {
    let (state, _dir) = test_state(Vec::new(), None);

    let (url_a, _) = spawn_fake_agent(
        StatusCode::SERVICE_UNAVAILABLE,
        ExecuteResponse::Error {
            error: "no rdp port available".to_owned(),
        },
    )
    .await;
    let (url_b, _) = spawn_fake_agent(
        StatusCode::OK,
        ExecuteResponse::Error {
            error: "image pull denied".to_owned(),
        },
    )
    .await;
    seed_agent(&state, "worker-a", &url_a, capacity(8, 1.0, 16384, 2048)).await;
    seed_agent(&state, "worker-b", &url_b, capacity(4, 0.0, 8192, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 2, 4096, false))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "DISPATCH_FAILED");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("worker-a"), "missing first diagnostic: {message}");
    assert!(message.contains("image pull denied"), "missing second diagnostic: {message}");
}

#[tokio::test]
async fn should_skip_offline_agents_during_placement() {
    // A zero online window makes every agent stale by the time /launch
    // snapshots the fleet.
    let (mut state, _dir) = test_state(Vec::new(), None);
    let mut config = (*state.config).clone();
    config.agent_online_window = std::time::Duration::ZERO;
    state.config = std::sync::Arc::new(config);

    let (url_a, calls_a) = spawn_fake_agent(StatusCode::OK, ok_reply(40123)).await;
    seed_agent(&state, "worker-a", &url_a, capacity(8, 0.0, 16384, 0)).await;

    let server = TestServer::new(build_router(state)).unwrap();
    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 2, 4096, false))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(calls_a.load(Ordering::SeqCst), 0);
}
