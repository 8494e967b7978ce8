//! Submission Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Feedback;

/// Stored submission row. File references are opaque storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub email: String,
    pub hobbies: String,
    pub profile_picture_key: String,
    pub source_code_key: String,
    pub created_at: i64,
}

/// Insert payload, built after both files are stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionCreate {
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub email: String,
    pub hobbies: String,
    pub profile_picture_key: String,
    pub source_code_key: String,
}

/// Applicant text fields collected by the intake form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantFields {
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub email: String,
    pub hobbies: String,
}

impl ApplicantFields {
    /// Name of the first blank field, if any
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("full_name", &self.full_name),
            ("phone_number", &self.phone_number),
            ("location", &self.location),
            ("email", &self.email),
            ("hobbies", &self.hobbies),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Submission with storage keys resolved to fetchable URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub location: String,
    pub email: String,
    pub hobbies: String,
    pub profile_picture_url: String,
    pub source_code_url: String,
    pub created_at: i64,
}

impl SubmissionView {
    pub fn from_submission(
        submission: Submission,
        profile_picture_url: String,
        source_code_url: String,
    ) -> Self {
        Self {
            id: submission.id,
            user_id: submission.user_id,
            full_name: submission.full_name,
            phone_number: submission.phone_number,
            location: submission.location,
            email: submission.email,
            hobbies: submission.hobbies,
            profile_picture_url,
            source_code_url,
            created_at: submission.created_at,
        }
    }
}

/// A submission joined with the feedback rows that reference it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub submission: SubmissionView,
    pub feedback: Vec<Feedback>,
}

/// Intake result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub submission: Submission,
    /// Confirmation page
    pub redirect: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_missing_reports_in_form_order() {
        let mut fields = ApplicantFields {
            full_name: "Ada".into(),
            phone_number: "555".into(),
            location: "  ".into(),
            email: String::new(),
            hobbies: "chess".into(),
        };
        assert_eq!(fields.first_missing(), Some("location"));
        fields.location = "London".into();
        assert_eq!(fields.first_missing(), Some("email"));
        fields.email = "ada@example.com".into();
        assert_eq!(fields.first_missing(), None);
    }
}
