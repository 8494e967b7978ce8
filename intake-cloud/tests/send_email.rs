mod common;

use axum::body::Body;
use std::sync::Arc;

use common::{RejectingProvider, spawn_app, spawn_app_with_provider, spawn_app_without_email};
use http::{Request, StatusCode};
use serde_json::json;

#[tokio::test]
async fn rejects_malformed_address() {
    let app = spawn_app();
    let (status, body) = app
        .post_json(
            "/api/send-email",
            None,
            json!({ "to": "not-an-email", "subject": "Hi", "message": "Hello" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid email format" }));
    assert!(app.emails.sent().is_empty());
}

#[tokio::test]
async fn accepts_plausible_address() {
    let app = spawn_app();
    let (status, body) = app
        .post_json(
            "/api/send-email",
            None,
            json!({ "to": "a@b.co", "subject": "Hi", "message": "Hello" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": "Email sent successfully!" }));
    assert_eq!(app.emails.sent().len(), 1);
}

#[tokio::test]
async fn missing_fields() {
    let app = spawn_app();
    let (status, body) = app
        .post_json("/api/send-email", None, json!({ "to": "a@b.co", "subject": "Hi" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing fields");
}

#[tokio::test]
async fn invalid_json() {
    let app = spawn_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/send-email")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON format");
}

#[tokio::test]
async fn missing_credential_is_a_server_error() {
    let app = spawn_app_without_email();
    let (status, body) = app
        .post_json(
            "/api/send-email",
            None,
            json!({ "to": "a@b.co", "subject": "Hi", "message": "Hello" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "API key not found");
}

#[tokio::test]
async fn provider_rejection_is_passed_through() {
    let app = spawn_app_with_provider(Arc::new(RejectingProvider {
        status: 400,
        body: r#"{"code":"invalid_parameter","message":"email is not valid in to"}"#.into(),
    }));
    let (status, body) = app
        .post_json(
            "/api/send-email",
            None,
            json!({ "to": "a@b.co", "subject": "Hi", "message": "Hello" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": { "code": "invalid_parameter", "message": "email is not valid in to" } })
    );
}
