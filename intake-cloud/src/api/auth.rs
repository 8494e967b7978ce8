//! Account endpoints
//!
//! POST /api/auth/signup — create account (email, password, role)
//! POST /api/auth/login  — credentials + selected role → session token

use axum::Json;
use axum::extract::State;
use shared::error::{AppError, ErrorCode};
use shared::models::{LoginRequest, LoginResponse, SignupRequest, User};
use uuid::Uuid;

use super::{ApiResult, ok};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::create_token;
use crate::db::UserRecord;
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<User> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Please fill in all fields.").into());
    }
    if !crate::email::is_valid_email(&email) {
        return Err(AppError::new(ErrorCode::EmailInvalid).into());
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password")
        .into());
    }

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::already_exists("Account").into());
    }

    let hashed_password = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    let record = UserRecord {
        id: Uuid::new_v4(),
        email,
        hashed_password,
        role: req.role,
        created_at: crate::db::now_millis(),
    };
    state.users.create(record.clone()).await?;

    tracing::info!(user_id = %record.id, role = %record.role, "Account created");
    ok(record.to_user())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(AppError::invalid_credentials().into());
    }

    // The role picked on the form must be the stored one
    if user.role != req.role {
        tracing::debug!(user_id = %user.id, selected = %req.role, "Login with wrong role");
        return Err(AppError::new(ErrorCode::RoleMismatch).into());
    }

    let token = create_token(user.id, &user.email, &state.jwt_secret).map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::new(ErrorCode::InternalError)
    })?;

    tracing::info!(user_id = %user.id, "Login");
    ok(LoginResponse {
        token,
        redirect: user.role.home_path().to_string(),
        user: user.to_user(),
    })
}
