//! POST /api/send-email — `{to, subject, message}`
//!
//! Flat `{success}` / `{error}` bodies rather than the `ApiResponse`
//! envelope, so existing email callers keep working.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

fn error_response(status: StatusCode, msg: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": msg })))
}

/// Provider rejections pass the provider's own body through (as JSON when
/// it parses); everything else is the error message.
fn error_body(e: &AppError) -> Value {
    let provider_body = e
        .details
        .as_ref()
        .filter(|_| e.code == ErrorCode::EmailProviderRejected)
        .and_then(|d| d.get("provider_body"))
        .and_then(Value::as_str);
    match provider_body {
        Some(body) => serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())),
        None => Value::String(e.message.clone()),
    }
}

pub async fn send_email(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let req: SendEmailRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!("send-email body rejected: {e}");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON format");
        }
    };

    match state
        .notifier
        .send_email(&req.to, &req.subject, &req.message)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": "Email sent successfully!" })),
        ),
        Err(e) => (e.http_status(), Json(json!({ "error": error_body(&e) }))),
    }
}
