//! Unified error codes for the intake portal
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Submission errors
//! - 4xxx: Feedback errors
//! - 5xxx: Storage errors
//! - 6xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the frontend can
/// branch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,

    // ==================== 2xxx: Permission ====================
    /// Stored role does not match the role the page requires
    RoleMismatch = 2002,
    /// Role lookup for the session failed
    RoleLookupFailed = 2003,

    // ==================== 3xxx: Submission ====================
    /// Submission not found
    SubmissionNotFound = 3001,
    /// Text fields or files missing from an intake
    SubmissionIncomplete = 3002,
    /// Profile picture could not be compressed
    ImageCompressionFailed = 3003,
    /// Source archive is not a readable zip file
    ArchiveInvalid = 3004,
    /// Uploaded file exceeds the size limit
    FileTooLarge = 3005,

    // ==================== 4xxx: Feedback ====================
    /// A decision by the same evaluator is already being recorded
    DecisionInFlight = 4002,
    /// Decision value is not accepted/rejected
    InvalidDecision = 4003,

    // ==================== 5xxx: Storage ====================
    /// Object upload failed
    UploadFailed = 5001,

    // ==================== 6xxx: Notification ====================
    /// Recipient address is not a plausible email
    EmailInvalid = 6001,
    /// Email provider rejected the request
    EmailProviderRejected = 6002,
    /// Email provider credential is not configured
    EmailNotConfigured = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password.",

            // Permission
            ErrorCode::RoleMismatch => "Invalid role",
            ErrorCode::RoleLookupFailed => "Failed to look up user role",

            // Submission
            ErrorCode::SubmissionNotFound => "Submission not found",
            ErrorCode::SubmissionIncomplete => "Please fill in all fields and upload your files.",
            ErrorCode::ImageCompressionFailed => "failed to compress the image",
            ErrorCode::ArchiveInvalid => "Source code must be a zip archive",
            ErrorCode::FileTooLarge => "File is too large",

            // Feedback
            ErrorCode::DecisionInFlight => "A decision for this submission is already being recorded",
            ErrorCode::InvalidDecision => "Decision must be accepted or rejected",

            // Storage
            ErrorCode::UploadFailed => "File upload failed",

            // Notification
            ErrorCode::EmailInvalid => "Invalid email format",
            ErrorCode::EmailProviderRejected => "Email provider rejected the request",
            ErrorCode::EmailNotConfigured => "API key not found",

            // System
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),

            // Permission
            2002 => Ok(ErrorCode::RoleMismatch),
            2003 => Ok(ErrorCode::RoleLookupFailed),

            // Submission
            3001 => Ok(ErrorCode::SubmissionNotFound),
            3002 => Ok(ErrorCode::SubmissionIncomplete),
            3003 => Ok(ErrorCode::ImageCompressionFailed),
            3004 => Ok(ErrorCode::ArchiveInvalid),
            3005 => Ok(ErrorCode::FileTooLarge),

            // Feedback
            4002 => Ok(ErrorCode::DecisionInFlight),
            4003 => Ok(ErrorCode::InvalidDecision),

            // Storage
            5001 => Ok(ErrorCode::UploadFailed),

            // Notification
            6001 => Ok(ErrorCode::EmailInvalid),
            6002 => Ok(ErrorCode::EmailProviderRejected),
            6003 => Ok(ErrorCode::EmailNotConfigured),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
