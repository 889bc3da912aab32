//! Heartbeat absorption and the fleet view endpoint.

use axum::http::StatusCode;
use axum_test::TestServer;

use deskpool_controller::router::build_router;

use crate::helpers::{capacity, launch_body, seed_agent, test_state};

fn heartbeat_body(agent_id: &str) -> serde_json::Value {
    serde_json::json!({
        "agent_id": agent_id,
        "url": "http://10.0.0.5:5001/",
        "total_cpu": 8,
        "used_cpu": 1.5,
        "total_mem_mb": 16384,
        "used_mem_mb": 2048,
        "running_containers": 2,
        "gpu_capable": false,
    })
}

async fn logged_in_server(state: deskpool_controller::state::AppState) -> TestServer {
    let mut server = TestServer::new(build_router(state)).unwrap();
    server.save_cookies();
    server
        .post("/login")
        .json(&serde_json::json!({"username": "alice", "password": "hunter2"}))
        .await
        .assert_status_ok();
    server
}

#[tokio::test]
async fn should_accept_a_complete_heartbeat() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let response = server.post("/heartbeat").json(&heartbeat_body("worker-a")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn should_name_the_first_missing_heartbeat_field() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let mut body = heartbeat_body("worker-a");
    body.as_object_mut().unwrap().remove("used_cpu");
    let response = server.post("/heartbeat").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "missing field: used_cpu");
}

#[tokio::test]
async fn should_reject_heartbeats_with_absurd_capacity() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let mut body = heartbeat_body("worker-a");
    body["total_mem_mb"] = serde_json::json!(64);
    let response = server.post("/heartbeat").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_expose_the_fleet_to_a_logged_in_session() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = logged_in_server(state).await;

    server
        .post("/heartbeat")
        .json(&heartbeat_body("worker-a"))
        .await
        .assert_status_ok();

    let response = server.get("/api/agents").await;
    response.assert_status_ok();
    let agents: serde_json::Value = response.json();
    let list = agents.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["agent_id"], "worker-a");
    assert_eq!(list[0]["online"], true);
    // Trailing slash is normalized away on absorption.
    assert_eq!(list[0]["url"], "http://10.0.0.5:5001");
    assert_eq!(list[0]["running_containers"], 2);
}

#[tokio::test]
async fn should_hide_the_fleet_from_anonymous_callers() {
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();
    server.get("/api/agents").await.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_guard_heartbeat_with_the_shared_secret_when_configured() {
    let (state, _dir) = test_state(Vec::new(), Some("fleet-secret".to_owned()));
    let server = TestServer::new(build_router(state)).unwrap();

    server
        .post("/heartbeat")
        .json(&heartbeat_body("worker-a"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/heartbeat")
        .authorization_bearer("fleet-secret")
        .json(&heartbeat_body("worker-a"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn should_consider_seeded_agents_when_listing() {
    let (state, _dir) = test_state(Vec::new(), None);
    seed_agent(&state, "worker-z", "http://z:5001", capacity(4, 0.0, 8192, 0)).await;
    seed_agent(&state, "worker-a", "http://a:5001", capacity(4, 0.0, 8192, 0)).await;

    let server = logged_in_server(state).await;
    let agents: serde_json::Value = server.get("/api/agents").await.json();
    let ids: Vec<&str> = agents
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["agent_id"].as_str().unwrap())
        .collect();
    // Stable listing order for the UI.
    assert_eq!(ids, ["worker-a", "worker-z"]);
}

#[tokio::test]
async fn should_use_refreshed_heartbeat_data_for_placement() {
    // A heartbeat that shrinks an agent's free memory must immediately
    // disqualify it.
    let (state, _dir) = test_state(Vec::new(), None);
    let server = TestServer::new(build_router(state)).unwrap();

    let mut body = heartbeat_body("worker-a");
    body["used_mem_mb"] = serde_json::json!(15360);
    server.post("/heartbeat").json(&body).await.assert_status_ok();

    let response = server
        .post("/launch")
        .json(&launch_body("alice", "hunter2", 2, 4096, false))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}
