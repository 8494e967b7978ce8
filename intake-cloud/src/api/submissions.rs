//! Submission endpoints
//!
//! POST /api/submissions — multipart intake (developer)
//! GET  /api/submissions — all submissions with file URLs (evaluator)
//!
//! Multipart fields: `full_name`, `phone_number`, `location`, `email`,
//! `hobbies` (text), `profile_picture` and `source_code` (files).

use axum::extract::{Multipart, State};
use axum::Extension;
use shared::error::{AppError, ErrorCode};
use shared::models::{SubmissionView, SubmitResponse};
use shared::pages::THANK_YOU_PATH;

use super::{ApiResult, ok};
use crate::auth::Session;
use crate::intake::{self, IntakeForm, UploadedFile};
use crate::review;
use crate::state::AppState;

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
}

async fn read_form(mut multipart: Multipart) -> Result<IntakeForm, AppError> {
    let mut form = IntakeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "profile_picture" | "source_code" => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?.to_vec();
                let file = Some(UploadedFile { file_name, data });
                if name == "profile_picture" {
                    form.profile_picture = file;
                } else {
                    form.source_code = file;
                }
            }
            "full_name" | "phone_number" | "location" | "email" | "hobbies" => {
                let value = field.text().await.map_err(multipart_error)?;
                let slot = match name.as_str() {
                    "full_name" => &mut form.fields.full_name,
                    "phone_number" => &mut form.fields.phone_number,
                    "location" => &mut form.fields.location,
                    "email" => &mut form.fields.email,
                    _ => &mut form.fields.hobbies,
                };
                *slot = value;
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

pub async fn create_submission(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> ApiResult<SubmitResponse> {
    let form = read_form(multipart).await?;
    let submission = intake::submit(&state, &session, form).await?;
    ok(SubmitResponse {
        submission,
        redirect: THANK_YOU_PATH.to_string(),
    })
}

pub async fn list_submissions(State(state): State<AppState>) -> ApiResult<Vec<SubmissionView>> {
    ok(review::load_submissions(&state).await?)
}
