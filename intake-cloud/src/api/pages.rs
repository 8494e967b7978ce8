//! GET /api/pages/{page} — gate decision for one page, session optional

use axum::extract::{Path, State};
use http::HeaderMap;
use shared::error::AppError;
use shared::pages::{GateDecision, Page};

use super::{ApiResult, ok};
use crate::auth::gate::page_decision;
use crate::state::AppState;

pub async fn page_gate(
    State(state): State<AppState>,
    Path(page): Path<String>,
    headers: HeaderMap,
) -> ApiResult<GateDecision> {
    let page = Page::from_slug(&page).ok_or_else(|| AppError::not_found(format!("Page {page}")))?;
    ok(page_decision(&state, &headers, page).await)
}
