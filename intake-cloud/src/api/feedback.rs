//! Feedback endpoints
//!
//! GET  /api/feedback                   — all feedback rows (evaluator)
//! GET  /api/review                     — submissions joined with feedback (evaluator)
//! POST /api/submissions/{id}/feedback  — record a decision (evaluator)
//! GET  /api/submissions/mine/feedback  — feedback on own submissions (developer)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{DecisionRequest, DecisionResponse, Feedback, OwnFeedback, ReviewEntry};
use uuid::Uuid;

use super::{ApiResult, ok};
use crate::auth::Session;
use crate::review;
use crate::state::AppState;

pub async fn list_feedback(State(state): State<AppState>) -> ApiResult<Vec<Feedback>> {
    ok(review::load_feedback(&state).await?)
}

pub async fn review_board(State(state): State<AppState>) -> ApiResult<Vec<ReviewEntry>> {
    ok(review::review_board(&state).await?)
}

pub async fn record_decision(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(submission_id): Path<Uuid>,
    payload: Result<Json<DecisionRequest>, JsonRejection>,
) -> ApiResult<DecisionResponse> {
    let Json(req) = payload.map_err(|e| {
        AppError::new(ErrorCode::InvalidDecision).with_detail("reason", e.body_text())
    })?;
    ok(review::record_decision(&state, &session, submission_id, req).await?)
}

pub async fn list_own_feedback(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<OwnFeedback>> {
    ok(review::own_feedback(&state, &session).await?)
}
