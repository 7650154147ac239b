//! Shared test harness: router construction, request helpers, and seed
//! data. Integration tests exercise the same middleware stack that
//! production uses via `build_app_router`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use portal_api::auth::jwt::{generate_access_token, JwtConfig};
use portal_api::auth::password::hash_password;
use portal_api::config::{ServerConfig, StorageConfig};
use portal_api::mailer::Mailer;
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_core::types::DbId;
use portal_db::models::user::CreateUser;
use portal_db::repositories::{RoleRepo, UserRepo};
use portal_storage::local::LocalObjectStore;
use portal_storage::memory::MemoryObjectStore;
use portal_storage::ObjectStore;

/// Fixed JWT secret shared by the test config and the token helper.
pub const TEST_JWT_SECRET: &str = "integration-test-secret-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_base_url: "http://localhost:3000".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        signed_url_ttl_secs: 600,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        storage: StorageConfig::Local {
            root: "./unused-in-tests".to_string(),
            signing_secret: "test-file-signing-secret".to_string(),
        },
        smtp: None,
    }
}

/// Build the application router over an in-memory object store.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_store(pool, Arc::new(MemoryObjectStore::new())).0
}

/// Build the application router, returning the object store so tests can
/// assert on stored objects.
pub fn build_test_app_with_store(
    pool: PgPool,
    store: Arc<MemoryObjectStore>,
) -> (Router, Arc<MemoryObjectStore>) {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        object_store: Arc::clone(&store) as Arc<dyn ObjectStore>,
        local_store: None,
        mailer: Arc::new(Mailer::disabled()),
    };
    (build_app_router(state, &config), store)
}

/// Build the application router over a local (filesystem) object store,
/// enabling the `/files/local` route.
pub fn build_test_app_with_local_store(
    pool: PgPool,
    root: &std::path::Path,
) -> (Router, Arc<LocalObjectStore>) {
    let config = test_config();
    let local = Arc::new(LocalObjectStore::new(
        root,
        config.public_base_url.clone(),
        "test-file-signing-secret",
    ));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        object_store: Arc::clone(&local) as Arc<dyn ObjectStore>,
        local_store: Some(Arc::clone(&local)),
        mailer: Arc::new(Mailer::disabled()),
    };
    (build_app_router(state, &config), local)
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// Insert a user with the given role and password, returning its id.
pub async fn seed_user(pool: &PgPool, email: &str, role: &str, password: &str) -> DbId {
    let role_row = RoleRepo::find_by_name(pool, role)
        .await
        .expect("role query should succeed")
        .expect("role should be seeded");

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            full_name: None,
            password_hash: Some(hash_password(password).expect("hashing should succeed")),
            role_id: role_row.id,
        },
    )
    .await
    .expect("user insert should succeed");

    user.id
}

/// Mint an access token for the given user without going through login.
pub fn token_for(user_id: DbId, role: &str) -> String {
    let config = test_config();
    generate_access_token(user_id, role, &config.jwt).expect("token generation should succeed")
}

/// Seed an editor user and return `(id, bearer token)`.
pub async fn seed_editor(pool: &PgPool) -> (DbId, String) {
    let id = seed_user(pool, "editor@example.com", "editor", "editor-password").await;
    let token = token_for(id, "editor");
    (id, token)
}

/// Seed a viewer user and return `(id, bearer token)`.
pub async fn seed_viewer(pool: &PgPool) -> (DbId, String) {
    let id = seed_user(pool, "viewer@example.com", "viewer", "viewer-password").await;
    let token = token_for(id, "viewer");
    (id, token)
}

/// Seed an admin user and return `(id, bearer token)`.
pub async fn seed_admin(pool: &PgPool) -> (DbId, String) {
    let id = seed_user(pool, "admin@example.com", "admin", "admin-password").await;
    let token = token_for(id, "admin");
    (id, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// Send a GET request.
pub async fn get(app: Router, path: &str, token: Option<&str>) -> Response<Body> {
    let request = with_auth(Request::builder().method("GET").uri(path), token)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(
    app: Router,
    path: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = with_auth(Request::builder().method("POST").uri(path), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a PUT request with a JSON body.
pub async fn put_json(
    app: Router,
    path: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = with_auth(Request::builder().method("PUT").uri(path), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a DELETE request.
pub async fn delete(app: Router, path: &str, token: Option<&str>) -> Response<Body> {
    let request = with_auth(Request::builder().method("DELETE").uri(path), token)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

// ---------------------------------------------------------------------------
// Multipart helpers
// ---------------------------------------------------------------------------

/// One part of a multipart/form-data body.
pub enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Assemble a multipart/form-data body from parts.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Send a POST request with a multipart/form-data body.
pub async fn post_multipart(
    app: Router,
    path: &str,
    token: Option<&str>,
    parts: &[Part<'_>],
) -> Response<Body> {
    let request = with_auth(Request::builder().method("POST").uri(path), token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Assert a response status, dumping the body on mismatch.
pub async fn assert_status(response: Response<Body>, expected: StatusCode) -> serde_json::Value {
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, expected, "unexpected status, body: {json}");
    json
}
