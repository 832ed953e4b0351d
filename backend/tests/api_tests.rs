//! End-to-end tests of the HTTP API against the in-memory repository.

mod support;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::json;

use support::{app, app_at, assert_envelope, send, send_with_headers, FULL_TODO};

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("not a timestamp: {}", value))
}

// =============================================================================
// Service routes
// =============================================================================

#[tokio::test]
async fn index_returns_success_envelope() {
    let (app, _) = app();
    let response = send(&app, "GET", "/", None).await;
    assert_envelope(&response, StatusCode::OK, "success");
}

#[tokio::test]
async fn health_reports_database_state() {
    let (app, repo) = app();

    let response = send(&app, "GET", "/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], "connected");

    repo.set_healthy(false);
    let response = send(&app, "GET", "/health", None).await;
    assert_eq!(response.body["database"], "disconnected");
}

#[tokio::test]
async fn routes_nest_under_base_path() {
    let (app, _) = app_at(Some("/api/v1/master"));

    let response = send(&app, "GET", "/api/v1/master/users", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));

    let response = send(&app, "GET", "/api/v1/master", None).await;
    assert_envelope(&response, StatusCode::OK, "success");

    let response = send(&app, "GET", "/users", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn create_user_assigns_id_and_timestamps() {
    let (app, _) = app();

    let response = send(&app, "POST", "/users", Some(r#"{"name":"Ayu"}"#)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], 1);
    assert_eq!(response.body["name"], "Ayu");
    assert_eq!(
        timestamp(&response.body["created_at"]),
        timestamp(&response.body["updated_at"])
    );
    assert!(response.body.get("deleted_at").is_none());
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let (app, _) = app();

    let response = send(&app, "POST", "/users", Some("{}")).await;
    assert_envelope(&response, StatusCode::BAD_REQUEST, "Required Name");

    let response = send(&app, "POST", "/status", Some(r#"{"status_text":null}"#)).await;
    assert_envelope(&response, StatusCode::BAD_REQUEST, "Required Status Text");

    let response = send(
        &app,
        "POST",
        "/todos",
        Some(r#"{"title":"t","description":"d","person_in_charge":"p","status":"Open"}"#),
    )
    .await;
    assert_envelope(&response, StatusCode::BAD_REQUEST, "Required Due Date");

    let response = send(
        &app,
        "POST",
        "/todos",
        Some(r#"{"title":"t","due_date":"2024-01-01"}"#),
    )
    .await;
    assert_envelope(&response, StatusCode::BAD_REQUEST, "Required Description");
}

#[tokio::test]
async fn create_accepts_empty_strings() {
    let (app, _) = app();
    let response = send(&app, "POST", "/users", Some(r#"{"name":""}"#)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "");
}

#[tokio::test]
async fn create_rejects_malformed_body() {
    let (app, _) = app();

    let response = send(&app, "POST", "/users", Some(r#"{"name":"#)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], 400);
    assert!(!response.body["message"].as_str().unwrap().is_empty());

    let response = send(&app, "POST", "/users", Some(r#"{"name":42}"#)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_id_is_conflict() {
    let (app, _) = app();

    let body = r#"{"id":7,"name":"first"}"#;
    assert_eq!(send(&app, "POST", "/users", Some(body)).await.status, StatusCode::OK);
    let response = send(&app, "POST", "/users", Some(body)).await;
    assert_envelope(&response, StatusCode::CONFLICT, "Duplicate User");

    let status = r#"{"id":3,"status_text":"Open"}"#;
    assert_eq!(send(&app, "POST", "/status", Some(status)).await.status, StatusCode::OK);
    let response = send(&app, "POST", "/status", Some(status)).await;
    assert_envelope(&response, StatusCode::CONFLICT, "Duplicate Status");

    let todo = r#"{"id":1,"title":"t","due_date":"2024-01-01","description":"d","person_in_charge":"p","status":"Open"}"#;
    assert_eq!(send(&app, "POST", "/todos", Some(todo)).await.status, StatusCode::OK);
    let response = send(&app, "POST", "/todos", Some(todo)).await;
    assert_envelope(&response, StatusCode::CONFLICT, "Duplicate Todo");
}

#[tokio::test]
async fn storage_rejections_on_create_are_internal_errors() {
    let (app, _) = app();

    let response = send(
        &app,
        "POST",
        "/status",
        Some(r#"{"status_text":"far too long for ten"}"#),
    )
    .await;
    assert_envelope(
        &response,
        StatusCode::INTERNAL_SERVER_ERROR,
        "value too long for type character varying(10)",
    );

    let response = send(
        &app,
        "POST",
        "/todos",
        Some(r#"{"title":"t","due_date":"tomorrow","description":"d","person_in_charge":"p","status":"Open"}"#),
    )
    .await;
    assert_envelope(
        &response,
        StatusCode::INTERNAL_SERVER_ERROR,
        "invalid input syntax for type date: \"tomorrow\"",
    );
}

// =============================================================================
// Read
// =============================================================================

#[tokio::test]
async fn todo_round_trip() {
    let (app, _) = app();

    let created = send(&app, "POST", "/todos", Some(FULL_TODO)).await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.body["id"].as_i64().unwrap();

    let fetched = send(&app, "GET", &format!("/todos/{}", id), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
    assert_eq!(fetched.body["due_date"], "2024-06-30");
    assert!(timestamp(&fetched.body["updated_at"]) >= timestamp(&fetched.body["created_at"]));

    let listed = send(&app, "GET", "/todos", None).await;
    assert_eq!(listed.body, json!([created.body]));
}

#[tokio::test]
async fn list_is_ordered_by_id() {
    let (app, _) = app();
    for body in [
        r#"{"id":5,"status_text":"Done"}"#,
        r#"{"status_text":"Open"}"#,
        r#"{"id":3,"status_text":"Doing"}"#,
    ] {
        assert_eq!(send(&app, "POST", "/status", Some(body)).await.status, StatusCode::OK);
    }

    let response = send(&app, "GET", "/status", None).await;
    let ids: Vec<i64> = response
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3, 5]);
}

#[tokio::test]
async fn get_unknown_or_non_numeric_id_is_not_found() {
    let (app, _) = app();

    let response = send(&app, "GET", "/todos/42", None).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "Not found");

    let response = send(&app, "GET", "/status/abc", None).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "Not found");
}

#[tokio::test]
async fn users_have_no_single_item_read() {
    let (app, _) = app();
    send(&app, "POST", "/users", Some(r#"{"name":"Ayu"}"#)).await;

    let response = send(&app, "GET", "/users/1", None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn update_merges_present_fields() {
    let (app, _) = app();
    let created = send(&app, "POST", "/todos", Some(FULL_TODO)).await;

    let response = send(
        &app,
        "PUT",
        "/todos/1",
        Some(r#"{"title":"Rewrite report","description":null}"#),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], "Rewrite report");
    assert_eq!(response.body["description"], "Quarterly numbers");
    assert_eq!(response.body["status"], "Open");
    assert_eq!(response.body["created_at"], created.body["created_at"]);
    assert!(timestamp(&response.body["updated_at"]) >= timestamp(&created.body["updated_at"]));

    let fetched = send(&app, "GET", "/todos/1", None).await;
    assert_eq!(fetched.body, response.body);
}

#[tokio::test]
async fn update_user_and_status() {
    let (app, _) = app();
    send(&app, "POST", "/users", Some(r#"{"name":"Ayu"}"#)).await;
    send(&app, "POST", "/status", Some(r#"{"status_text":"Open"}"#)).await;

    let response = send(&app, "PUT", "/users/1", Some(r#"{"name":"Budi"}"#)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Budi");

    let response = send(&app, "PUT", "/status/1", Some("{}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status_text"], "Open");
}

#[tokio::test]
async fn update_unknown_id_reports_lookup_error() {
    let (app, _) = app();

    let response = send(&app, "PUT", "/todos/7", Some(r#"{"title":"x"}"#)).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "record not found 7");

    let response = send(&app, "PUT", "/users/abc", Some(r#"{"name":"x"}"#)).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "record not found abc");
}

#[tokio::test]
async fn update_rejects_closed_todo_status() {
    let (app, _) = app();
    send(&app, "POST", "/todos", Some(FULL_TODO)).await;

    let response = send(&app, "PUT", "/todos/1", Some(r#"{"status":"Done"}"#)).await;
    assert_envelope(
        &response,
        StatusCode::BAD_REQUEST,
        "Can't Change Status When is Done",
    );

    let response = send(&app, "PUT", "/todos/1", Some(r#"{"status":"Delete"}"#)).await;
    assert_envelope(
        &response,
        StatusCode::BAD_REQUEST,
        "Can't Change Status When is Delete",
    );

    let fetched = send(&app, "GET", "/todos/1", None).await;
    assert_eq!(fetched.body["status"], "Open");
}

#[tokio::test]
async fn update_rejects_malformed_body() {
    let (app, _) = app();
    send(&app, "POST", "/users", Some(r#"{"name":"Ayu"}"#)).await;

    let response = send(&app, "PUT", "/users/1", Some("not json")).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], 400);
}

#[tokio::test]
async fn update_rejects_array_body() {
    let (app, _) = app();
    send(&app, "POST", "/todos", Some(FULL_TODO)).await;

    let response = send(
        &app,
        "PUT",
        "/todos/1",
        Some(r#"["hijacked",null,null,null,"Open"]"#),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["status"], 400);

    let fetched = send(&app, "GET", "/todos/1", None).await;
    assert_eq!(fetched.body["title"], "Write report");
}

#[tokio::test]
async fn update_with_null_body_keeps_row() {
    let (app, _) = app();
    send(&app, "POST", "/users", Some(r#"{"name":"Ayu"}"#)).await;

    let response = send(&app, "PUT", "/users/1", Some("null")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["id"], 1);
    assert_eq!(response.body["name"], "Ayu");
}

#[tokio::test]
async fn update_storage_rejection_is_conflict() {
    let (app, _) = app();
    send(&app, "POST", "/status", Some(r#"{"status_text":"Open"}"#)).await;

    let response = send(
        &app,
        "PUT",
        "/status/1",
        Some(r#"{"status_text":"much too long"}"#),
    )
    .await;
    assert_envelope(
        &response,
        StatusCode::CONFLICT,
        "value too long for type character varying(10)",
    );
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn soft_delete_hides_but_keeps_row() {
    let (app, repo) = app();
    send(&app, "POST", "/todos", Some(FULL_TODO)).await;

    let response = send(&app, "DELETE", "/todos/1", None).await;
    assert_envelope(&response, StatusCode::OK, "success");

    let response = send(&app, "GET", "/todos/1", None).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "Not found");
    assert_eq!(send(&app, "GET", "/todos", None).await.body, json!([]));

    let raw = repo.todo_table().raw_row(1).unwrap();
    assert!(raw.is_deleted());
    assert_eq!(raw.fields.title.as_deref(), Some("Write report"));

    let response = send(&app, "DELETE", "/todos/1", None).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "Not found");

    let response = send(&app, "PUT", "/todos/1", Some(r#"{"title":"back"}"#)).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "record not found 1");

    // The id stays taken.
    let response = send(
        &app,
        "POST",
        "/todos",
        Some(r#"{"id":1,"title":"t","due_date":"2024-01-01","description":"d","person_in_charge":"p","status":"Open"}"#),
    )
    .await;
    assert_envelope(&response, StatusCode::CONFLICT, "Duplicate Todo");
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let (app, _) = app();

    let response = send(&app, "DELETE", "/users/9", None).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "Not found");

    let response = send(&app, "DELETE", "/status/x", None).await;
    assert_envelope(&response, StatusCode::NOT_FOUND, "Not found");
}

// =============================================================================
// Request headers
// =============================================================================

#[tokio::test]
async fn caller_headers_do_not_change_outcome() {
    let (app, _) = app();

    let response = send_with_headers(
        &app,
        "POST",
        "/users",
        Some(r#"{"name":"Ayu"}"#),
        &[
            ("x-user-id", "67e55044-10b1-426f-9247-bb680e5fe0c8"),
            ("accept-language", "id-ID,id;q=0.9"),
        ],
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send_with_headers(
        &app,
        "DELETE",
        "/users/1",
        None,
        &[("x-user-id", "not-a-uuid"), ("accept-language", "*")],
    )
    .await;
    assert_envelope(&response, StatusCode::OK, "success");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let (app, _) = app();
    let request = Request::builder()
        .uri("/users")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
