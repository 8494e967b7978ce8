//! Feedback Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::ParseEnumError;

/// Evaluator decision on a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepted => "accepted",
            Decision::Rejected => "rejected",
        }
    }

    /// Notification subject sent to the applicant
    pub fn email_subject(&self) -> &'static str {
        match self {
            Decision::Accepted => "Submission Accepted",
            Decision::Rejected => "Submission Rejected",
        }
    }

    /// Notification body sent to the applicant
    pub fn email_message(&self, comments: &str) -> String {
        format!(
            "Your submission has been {}.\n\nFeedback:\n{comments}",
            self.as_str()
        )
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Decision {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Decision::Accepted),
            "rejected" => Ok(Decision::Rejected),
            other => Err(ParseEnumError {
                kind: "decision",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Decision {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Stored feedback row (append-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Feedback {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub evaluator_id: Uuid,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub decision: Decision,
    pub comments: String,
    pub created_at: i64,
}

/// Insert payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackCreate {
    pub submission_id: Uuid,
    pub evaluator_id: Uuid,
    pub decision: Decision,
    pub comments: String,
}

/// Body of `POST /api/submissions/{id}/feedback`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
    #[serde(default)]
    pub comments: String,
}

/// Outcome of the notification that follows a recorded decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub sent: bool,
    /// Alert text shown to the evaluator
    pub message: String,
}

/// Result of recording a decision; the row is persisted even when
/// the notification failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub feedback: Feedback,
    pub notification: NotificationOutcome,
}

/// Feedback as shown to the developer who owns the submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OwnFeedback {
    pub submission_id: Uuid,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub decision: Decision,
    pub comments: String,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_follow_decision() {
        assert_eq!(Decision::Accepted.email_subject(), "Submission Accepted");
        assert_eq!(Decision::Rejected.email_subject(), "Submission Rejected");
    }

    #[test]
    fn message_embeds_comments() {
        let msg = Decision::Accepted.email_message("Great work");
        assert_eq!(
            msg,
            "Your submission has been accepted.\n\nFeedback:\nGreat work"
        );
    }

    #[test]
    fn decision_request_defaults_comments() {
        let req: DecisionRequest = serde_json::from_str(r#"{"decision":"rejected"}"#).unwrap();
        assert_eq!(req.decision, Decision::Rejected);
        assert!(req.comments.is_empty());
        assert!(serde_json::from_str::<DecisionRequest>(r#"{"decision":"maybe"}"#).is_err());
    }

    #[test]
    fn feedback_wire_shape() {
        let fb = Feedback {
            id: Uuid::nil(),
            submission_id: Uuid::nil(),
            evaluator_id: Uuid::nil(),
            decision: Decision::Accepted,
            comments: "Great work".into(),
            created_at: 1,
        };
        let json = serde_json::to_value(&fb).unwrap();
        assert_eq!(json["decision"], "accepted");
        assert_eq!(json["comments"], "Great work");
    }
}
