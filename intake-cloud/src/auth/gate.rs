//! Role gate enforcement for API routes
//!
//! Wraps [`shared::pages::check_role`]: no valid session is a `401` with
//! `redirect: /login`, a role mismatch (or failed lookup) is a `403` with
//! `redirect: /unauthorized`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::HeaderMap;
use shared::error::{AppError, ErrorCode};
use shared::models::Role;
use shared::pages::{GateDecision, GateOutcome, LOGIN_PATH, Page, UNAUTHORIZED_PATH};

use super::session::{Session, bearer_token, identity};
use crate::state::AppState;

fn login_required() -> AppError {
    AppError::not_authenticated().with_detail("redirect", LOGIN_PATH)
}

/// Stored role of a user, with store failures flattened to a message
async fn lookup_role(state: &AppState, user_id: uuid::Uuid) -> Result<Option<Role>, String> {
    state.users.find_role(user_id).await.map_err(|e| {
        tracing::warn!(user_id = %user_id, error = %e, "Role lookup failed");
        e.to_string()
    })
}

/// Resolve a token into a [`Session`] holding `required`, or the error
/// carrying the redirect the caller should follow.
pub async fn authorize(
    state: &AppState,
    token: Option<&str>,
    required: Role,
) -> Result<Session, AppError> {
    let (user_id, email) = token
        .and_then(|t| identity(t, &state.jwt_secret))
        .ok_or_else(login_required)?;

    let decision = shared::pages::check_role(required, true, lookup_role(state, user_id).await);

    match decision.outcome {
        GateOutcome::Allow => Ok(Session {
            user_id,
            email,
            role: required,
        }),
        GateOutcome::RedirectLogin => Err(login_required()),
        GateOutcome::RedirectUnauthorized => {
            tracing::debug!(user_id = %user_id, required = %required, "Role gate denied");
            let err = match decision.error {
                Some(lookup_error) => AppError::new(ErrorCode::RoleLookupFailed)
                    .with_detail("error", lookup_error),
                None => AppError::new(ErrorCode::RoleMismatch),
            };
            Err(err.with_detail("redirect", UNAUTHORIZED_PATH))
        }
    }
}

/// Gate decision for a page, with the session taken from the headers if any
pub async fn page_decision(state: &AppState, headers: &HeaderMap, page: Page) -> GateDecision {
    let user = bearer_token(headers).and_then(|t| identity(t, &state.jwt_secret));
    let stored_role = match (&user, page.required_role()) {
        (Some((user_id, _)), Some(_)) => lookup_role(state, *user_id).await,
        _ => Ok(None),
    };
    page.gate(user.is_some(), stored_role)
}

async fn gate(state: &AppState, required: Role, mut request: Request, next: Next) -> Response {
    match authorize(state, bearer_token(request.headers()), required).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

pub async fn require_developer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, Role::Developer, request, next).await
}

pub async fn require_evaluator(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate(&state, Role::Evaluator, request, next).await
}
