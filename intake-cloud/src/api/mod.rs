//! API routes for intake-cloud

pub mod auth;
pub mod feedback;
pub mod feedback_ws;
pub mod health;
pub mod pages;
pub mod send_email;
pub mod submissions;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use shared::error::ApiResponse;
use tower_http::trace::TraceLayer;

use crate::auth::{require_developer, require_evaluator};
use crate::error::ServiceError;
use crate::intake::MAX_UPLOAD_BYTES;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ServiceError>;

/// Wrap a payload in the success envelope
pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/pages/{page}", get(pages::page_gate))
        .route("/api/send-email", post(send_email::send_email));

    // Developer pages (/submit)
    let developer = Router::new()
        .route(
            "/api/submissions",
            post(submissions::create_submission)
                // picture + archive + text fields
                .layer(DefaultBodyLimit::max(2 * MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route(
            "/api/submissions/mine/feedback",
            get(feedback::list_own_feedback),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_developer,
        ));

    // Evaluator pages (/evaluate)
    let evaluator = Router::new()
        .route("/api/submissions", get(submissions::list_submissions))
        .route("/api/feedback", get(feedback::list_feedback))
        .route("/api/review", get(feedback::review_board))
        .route(
            "/api/submissions/{id}/feedback",
            post(feedback::record_decision),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_evaluator,
        ));

    // Browser WebSockets cannot set headers; the token is checked in the handler
    let feed = Router::new().route("/api/feedback/ws", get(feedback_ws::handle_feedback_ws));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(public)
        .merge(developer)
        .merge(evaluator)
        .merge(feed)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
