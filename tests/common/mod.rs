//! Test helpers for the HTTP API tests.
//!
//! Every test gets its own in-memory database with one seeded machine
//! (`MACHINE-001` / `pass123`) and cheap Argon2 parameters.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::{json, Value};

use bde_tracker::auth::{register_machine, PasswordHasher, TokenService};
use bde_tracker::web::{create_router, AppState};
use bde_tracker::{Database, Machine};

/// Signing secret shared by the test server and hand-made tokens.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Seeded machine credentials.
pub const MACHINE_ID: &str = "MACHINE-001";
pub const MACHINE_PASSWORD: &str = "pass123";

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub state: Arc<AppState>,
    pub machine: Machine,
}

/// Token service configured like the test server's.
pub fn test_tokens() -> TokenService {
    TokenService::new(TEST_SECRET, 3600, 0)
}

/// Create a test server with an in-memory database and a seeded machine.
pub async fn spawn_app() -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");
    let hasher = PasswordHasher::new(1024, 1, 1).expect("valid test params");

    let machine = register_machine(&db, &hasher, MACHINE_ID, MACHINE_PASSWORD)
        .await
        .expect("Failed to seed machine");

    let state = Arc::new(AppState::new(db.clone(), test_tokens(), hasher));
    let router = create_router(state.clone(), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        state,
        machine,
    }
}

/// Log in and return the access token.
pub async fn login(server: &TestServer, machine_id: &str, password: &str) -> String {
    let response = server
        .post("/api/machines/login")
        .json(&json!({
            "machine_id": machine_id,
            "password": password
        }))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["access_token"]
        .as_str()
        .expect("access_token in login response")
        .to_string()
}

/// Log in as the seeded machine and return an `Authorization` header value.
pub async fn auth_header(server: &TestServer) -> String {
    format!("Bearer {}", login(server, MACHINE_ID, MACHINE_PASSWORD).await)
}

/// Create a user through the API and return its ID.
pub async fn create_user(server: &TestServer, auth: &str, name: &str, role: &str) -> i64 {
    let response = server
        .post("/api/users")
        .add_header(axum::http::header::AUTHORIZATION, auth.to_string())
        .json(&json!({ "name": name, "role": role }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["id"]
        .as_i64()
        .expect("id in user response")
}

/// A valid work session body for `user_id`.
pub fn work_session_body(user_id: i64) -> Value {
    json!({
        "user_id": user_id,
        "part_number": "PN-12345",
        "order_number": "ORD-2024-001",
        "performance_id": "PERF-001",
        "duration_seconds": 5400,
        "start_time": "2024-03-01T06:00:00Z",
        "end_time": "2024-03-01T07:30:00Z"
    })
}
