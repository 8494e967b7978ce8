//! Review feed and decision recorder

use dashmap::DashSet;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    DecisionRequest, DecisionResponse, Feedback, FeedbackCreate, NotificationOutcome, OwnFeedback,
    ReviewEntry, SubmissionView,
};
use uuid::Uuid;

use crate::auth::Session;
use crate::error::ServiceResult;
use crate::live::FeedbackSubscription;
use crate::state::AppState;
use crate::storage::Bucket;

pub const EMAIL_FAILED_ALERT: &str = "Failed to send email.";

pub fn email_sent_alert(to: &str) -> String {
    format!("Email sent successfully to {to}.")
}

/// All submissions with both storage keys resolved to public URLs
pub async fn load_submissions(state: &AppState) -> ServiceResult<Vec<SubmissionView>> {
    let rows = state.submissions.list_all().await?;
    Ok(rows
        .into_iter()
        .map(|s| {
            let picture = state.objects.public_url(Bucket::ProfilePictures, &s.profile_picture_key);
            let archive = state.objects.public_url(Bucket::SourceCode, &s.source_code_key);
            SubmissionView::from_submission(s, picture, archive)
        })
        .collect())
}

pub async fn load_feedback(state: &AppState) -> ServiceResult<Vec<Feedback>> {
    Ok(state.feedback.list_all().await?)
}

/// Submissions joined in memory with the feedback that references them
pub async fn review_board(state: &AppState) -> ServiceResult<Vec<ReviewEntry>> {
    let submissions = load_submissions(state).await?;
    let feedback = load_feedback(state).await?;
    Ok(submissions
        .into_iter()
        .map(|submission| {
            let feedback = feedback
                .iter()
                .filter(|f| f.submission_id == submission.id)
                .cloned()
                .collect();
            ReviewEntry {
                submission,
                feedback,
            }
        })
        .collect())
}

/// Feedback on the caller's own submissions only
pub async fn own_feedback(state: &AppState, session: &Session) -> ServiceResult<Vec<OwnFeedback>> {
    Ok(state.feedback.list_for_owner(session.user_id).await?)
}

pub fn subscribe_feedback(state: &AppState) -> FeedbackSubscription {
    state.hub.subscribe()
}

/// Marks a (submission, evaluator) pair busy until dropped
struct InFlight<'a> {
    set: &'a DashSet<(Uuid, Uuid)>,
    key: (Uuid, Uuid),
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a DashSet<(Uuid, Uuid)>, key: (Uuid, Uuid)) -> Option<Self> {
        set.insert(key).then(|| Self { set, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.key);
    }
}

/// Append one feedback row, then notify the applicant.
///
/// A failed notification is reported in the response; the row stays.
pub async fn record_decision(
    state: &AppState,
    evaluator: &Session,
    submission_id: Uuid,
    request: DecisionRequest,
) -> ServiceResult<DecisionResponse> {
    let submission = state
        .submissions
        .find_by_id(submission_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SubmissionNotFound))?;

    let _guard = InFlight::acquire(&state.decisions_in_flight, (submission_id, evaluator.user_id))
        .ok_or_else(|| AppError::new(ErrorCode::DecisionInFlight))?;

    let feedback = state
        .feedback
        .insert(FeedbackCreate {
            submission_id,
            evaluator_id: evaluator.user_id,
            decision: request.decision,
            comments: request.comments,
        })
        .await?;

    tracing::info!(
        submission_id = %submission_id,
        evaluator_id = %evaluator.user_id,
        decision = %feedback.decision,
        "Decision recorded"
    );

    let notification = match state
        .notifier
        .send_email(
            &submission.email,
            feedback.decision.email_subject(),
            &feedback.decision.email_message(&feedback.comments),
        )
        .await
    {
        Ok(()) => NotificationOutcome {
            sent: true,
            message: email_sent_alert(&submission.email),
        },
        Err(e) => {
            tracing::warn!(
                submission_id = %submission_id,
                code = %e.code,
                error = %e.message,
                "Decision notification failed"
            );
            NotificationOutcome {
                sent: false,
                message: EMAIL_FAILED_ALERT.to_string(),
            }
        }
    };

    Ok(DecisionResponse {
        feedback,
        notification,
    })
}
