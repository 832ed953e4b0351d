#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use todo_service::db::{FullRepository, LocalRepository};
use todo_service::http::{create_router, AppState};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on drop (also on unwind) and serializes
/// access to the process environment across tests in the same binary.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Router over a fresh in-memory repository, plus a handle on that
/// repository for inspecting stored rows.
pub fn app() -> (Router, LocalRepository) {
    app_at(None)
}

pub fn app_at(base_path: Option<&str>) -> (Router, LocalRepository) {
    let repo = LocalRepository::new();
    let shared: Arc<dyn FullRepository> = Arc::new(repo.clone());
    (create_router(AppState::new(shared, "en"), base_path), repo)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Send one request through the router and decode the JSON body.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> TestResponse {
    send_with_headers(app, method, uri, body, &[]).await
}

pub async fn send_with_headers(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    let request = builder
        .body(Body::from(body.unwrap_or_default().to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse { status, body }
}

/// Asserts the `{status, message}` envelope.
pub fn assert_envelope(response: &TestResponse, status: StatusCode, message: &str) {
    assert_eq!(response.status, status, "body: {}", response.body);
    assert_eq!(response.body["status"], status.as_u16());
    assert_eq!(response.body["message"], message);
}

pub const FULL_TODO: &str = r#"{
    "title": "Write report",
    "description": "Quarterly numbers",
    "due_date": "2024-06-30",
    "person_in_charge": "Ayu",
    "status": "Open"
}"#;
