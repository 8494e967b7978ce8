//! Unified service-layer error type for intake-cloud
//!
//! `ServiceError` bridges the gap between infrastructure errors
//! (`sqlx::Error`, S3, `BoxError`) and the API-layer error (`AppError`),
//! so handlers can use `?` without hand-written `map_err` chains.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error.
///
/// - `Db`: Database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, AWS SDK, serde, etc.)
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

/// Stores report business-rule failures as a boxed `AppError`; those keep
/// their code instead of collapsing into an internal error.
impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        match e.downcast::<AppError>() {
            Ok(app) => ServiceError::App(*app),
            Err(e) => ServiceError::Db(e),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "{e}"),
            ServiceError::App(e) => write!(f, "{e}"),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_app_errors_keep_their_code() {
        let boxed: BoxError = Box::new(AppError::already_exists("Account"));
        match ServiceError::from(boxed) {
            ServiceError::App(e) => assert_eq!(e.code, ErrorCode::AlreadyExists),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn other_boxed_errors_are_internal() {
        let boxed: BoxError = "connection reset".into();
        let app: AppError = ServiceError::from(boxed).into();
        assert_eq!(app.code, ErrorCode::InternalError);
    }
}
