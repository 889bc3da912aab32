use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};

use deskpool_controller::config::ControllerConfig;
use deskpool_controller::infra::http::HttpAgentCaller;
use deskpool_controller::infra::users::{FileUserStore, hash_password};
use deskpool_controller::state::{AppState, Fleet};
use deskpool_controller::usecase::session::Sessions;
use deskpool_domain::capacity::CapacitySnapshot;
use deskpool_wire::execute::ExecuteResponse;
use deskpool_wire::fleet::HeartbeatBody;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config(user_file: PathBuf, api_token: Option<String>) -> ControllerConfig {
    ControllerConfig {
        server_port: 0,
        secret_key: TEST_SECRET.to_owned(),
        session_lifetime: Duration::from_secs(60),
        agent_online_window: Duration::from_secs(40),
        dispatch_timeout: Duration::from_secs(2),
        fallback_retry_delay: Duration::from_millis(5),
        user_file,
        allowed_images_file: PathBuf::from("allowed_images.txt"),
        api_token,
    }
}

/// Build an `AppState` around a temp user store seeded with `alice`
/// (standard, password `hunter2`) and `petra` (power, password `s3cure`).
pub fn test_state(allowed_images: Vec<String>, api_token: Option<String>) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let user_file = dir.path().join("users.txt");
    let mut f = std::fs::File::create(&user_file).unwrap();
    writeln!(f, "alice:{}:false:standard", hash_password("hunter2")).unwrap();
    writeln!(f, "petra:{}:false:power", hash_password("s3cure")).unwrap();
    writeln!(f, "newbie:{}:true:standard", hash_password("changeme")).unwrap();
    drop(f);

    let config = test_config(user_file.clone(), api_token.clone());
    let state = AppState {
        fleet: Fleet::new(),
        sessions: Sessions::new(config.session_lifetime),
        users: FileUserStore::new(user_file),
        caller: HttpAgentCaller::new(config.dispatch_timeout, api_token).unwrap(),
        allowed_images: Arc::new(allowed_images),
        config: Arc::new(config),
    };
    (state, dir)
}

pub fn capacity(total_cpu: u32, used_cpu: f64, total_mem: u64, used_mem: u64) -> CapacitySnapshot {
    CapacitySnapshot {
        total_cpu,
        used_cpu,
        total_mem_mb: total_mem,
        used_mem_mb: used_mem,
        running_containers: 0,
        gpu_capable: false,
    }
}

/// Register an agent in the fleet as if it had just heartbeated.
pub async fn seed_agent(state: &AppState, agent_id: &str, url: &str, capacity: CapacitySnapshot) {
    state
        .fleet
        .absorb(HeartbeatBody {
            agent_id: agent_id.to_owned(),
            url: url.to_owned(),
            capacity,
        })
        .await;
}

/// A loopback agent whose `/execute` always answers `reply` with `status`.
/// Returns its base URL and a call counter.
pub async fn spawn_fake_agent(
    status: StatusCode,
    reply: ExecuteResponse,
) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let app = Router::new().route(
        "/execute",
        post(move |_body: Json<serde_json::Value>| {
            let counter = Arc::clone(&counter);
            let reply = reply.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, Json(reply))
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), calls)
}

pub fn ok_reply(port: u16) -> ExecuteResponse {
    ExecuteResponse::Ok {
        rdp_host: "10.0.0.5".to_owned(),
        rdp_port: port,
        container_id: "cafebabe".to_owned(),
        startup_seconds: Some(1.2),
    }
}

pub fn launch_body(username: &str, password: &str, cpu: u32, mem: u64, gpu: bool) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "password": password,
        "image": "desk/xfce:1",
        "cpu_limit": cpu,
        "memory_limit_mb": mem,
        "gpu": gpu,
    })
}
