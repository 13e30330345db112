//! Shared helpers for the Web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use docvault::config::WebConfig;
use docvault::db::{UserRepository, UserUpdate};
use docvault::file::FileStorage;
use docvault::web::handlers::AppState;
use docvault::web::middleware::{JwtState, RateLimitState};
use docvault::web::router::{create_health_router, create_router};
use docvault::Database;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const PASSWORD: &str = "password123";

/// Create a test configuration.
pub fn create_test_config() -> WebConfig {
    WebConfig {
        enabled: true,
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![],
        jwt_secret: "test-secret-key-for-testing-only".to_string(),
        jwt_access_token_expiry_secs: 900,
        jwt_refresh_token_expiry_days: 7,
        login_rate_limit: 100,
        api_rate_limit: 1000,
    }
}

/// A running test server with its database and blob directory.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub storage: FileStorage,
    _blob_dir: TempDir,
}

/// Create a test server over an in-memory database and a temp-dir blob store.
pub async fn create_test_server() -> TestApp {
    create_test_server_with(create_test_config(), 10 * 1024 * 1024).await
}

pub async fn create_test_server_with(config: WebConfig, max_upload_size: u64) -> TestApp {
    let blob_dir = TempDir::new().expect("Failed to create blob directory");
    let storage = FileStorage::new(blob_dir.path()).expect("Failed to create storage");

    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let app_state = Arc::new(
        AppState::new(
            db.clone(),
            Arc::new(storage.clone()),
            &config.jwt_secret,
            config.jwt_access_token_expiry_secs,
            config.jwt_refresh_token_expiry_days,
        )
        .with_max_upload_size(max_upload_size),
    );
    let jwt_state = Arc::new(JwtState::new(&config.jwt_secret));
    let rate_limit = Arc::new(RateLimitState::new(
        config.login_rate_limit,
        config.api_rate_limit,
    ));

    let router = create_router(app_state, jwt_state, rate_limit, &config.cors_origins)
        .merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        storage,
        _blob_dir: blob_dir,
    }
}

/// Register a user and return the response body.
pub async fn register_test_user(server: &TestServer, username: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": username,
            "password": PASSWORD,
            "email": format!("{username}@example.com"),
            "first_name": "Test",
            "last_name": "User"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()
}

/// Log in and return the response body.
pub async fn login_user(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/api/auth/login")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
        .json::<Value>()
}

/// Register a user and return (user id, access token).
pub async fn create_user_with_token(server: &TestServer, username: &str) -> (i64, String) {
    let registered = register_test_user(server, username).await;
    let user_id = registered["data"]["id"].as_i64().expect("user id");

    let login = login_user(server, username, PASSWORD).await;
    let token = login["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();

    (user_id, token)
}

/// Register a staff user and return (user id, access token).
pub async fn create_staff_with_token(app: &TestApp, username: &str) -> (i64, String) {
    let registered = register_test_user(&app.server, username).await;
    let user_id = registered["data"]["id"].as_i64().expect("user id");

    UserRepository::new(app.db.pool())
        .update(user_id, &UserUpdate::new().is_staff(true))
        .await
        .expect("Failed to promote user");

    // The staff flag travels in the token, so log in after promotion.
    let login = login_user(&app.server, username, PASSWORD).await;
    let token = login["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();

    (user_id, token)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Create a folder and return its id.
pub async fn create_folder(server: &TestServer, token: &str, name: &str) -> i64 {
    let response = server
        .post("/api/folders")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["data"]["id"]
        .as_i64()
        .expect("folder id")
}

/// Multipart form with a single `file` part.
pub fn file_form(file_name: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(content.to_vec()).file_name(file_name))
}

/// Upload a file into a folder.
pub async fn upload_file(
    server: &TestServer,
    token: &str,
    folder_id: i64,
    file_name: &str,
    content: &[u8],
) -> TestResponse {
    server
        .post(&format!("/api/folders/{}/files", folder_id))
        .add_header(AUTHORIZATION, bearer(token))
        .multipart(file_form(file_name, content))
        .await
}

/// Upload a file into a folder and return its id.
pub async fn upload_file_id(
    server: &TestServer,
    token: &str,
    folder_id: i64,
    file_name: &str,
    content: &[u8],
) -> i64 {
    let response = upload_file(server, token, folder_id, file_name, content).await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["data"]["id"]
        .as_i64()
        .expect("file id")
}
