//! Evaluator screen state
//!
//! Holds the loaded submissions and feedback, per-submission comment
//! drafts and busy flags, and patches the feedback list from the change
//! feed. Rendering filters feedback by `submission_id`.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::feed::{FeedMessage, apply_change};
use crate::models::{DecisionResponse, Feedback, SubmissionView};

/// Alert shown when the decision insert fails
pub const DECISION_FAILED_ALERT: &str = "Failed to submit feedback.";

#[derive(Debug, Default)]
pub struct ReviewBoard {
    submissions: Vec<SubmissionView>,
    feedback: Vec<Feedback>,
    drafts: HashMap<Uuid, String>,
    busy: HashSet<Uuid>,
    alert: Option<String>,
}

impl ReviewBoard {
    pub fn new(submissions: Vec<SubmissionView>, feedback: Vec<Feedback>) -> Self {
        Self {
            submissions,
            feedback,
            ..Self::default()
        }
    }

    pub fn submissions(&self) -> &[SubmissionView] {
        &self.submissions
    }

    pub fn feedback(&self) -> &[Feedback] {
        &self.feedback
    }

    /// Feedback rows rendered under one submission
    pub fn feedback_for(&self, submission_id: Uuid) -> Vec<&Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.submission_id == submission_id)
            .collect()
    }

    pub fn set_draft(&mut self, submission_id: Uuid, text: impl Into<String>) {
        self.drafts.insert(submission_id, text.into());
    }

    pub fn draft(&self, submission_id: Uuid) -> &str {
        self.drafts
            .get(&submission_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_busy(&self, submission_id: Uuid) -> bool {
        self.busy.contains(&submission_id)
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn clear_alert(&mut self) {
        self.alert = None;
    }

    /// Mark a submission busy and hand back the comment to send.
    ///
    /// Returns `None` while a previous decision on the same submission is
    /// still in flight (the buttons are disabled).
    pub fn begin_decision(&mut self, submission_id: Uuid) -> Option<String> {
        if !self.busy.insert(submission_id) {
            return None;
        }
        Some(self.draft(submission_id).to_string())
    }

    /// Settle a decision started with [`begin_decision`](Self::begin_decision).
    ///
    /// On success the draft is cleared and the notification outcome becomes
    /// the alert; the new row itself arrives through the change feed.
    pub fn finish_decision(
        &mut self,
        submission_id: Uuid,
        result: Result<&DecisionResponse, &str>,
    ) {
        self.busy.remove(&submission_id);
        match result {
            Ok(response) => {
                self.drafts.insert(submission_id, String::new());
                self.alert = Some(response.notification.message.clone());
            }
            Err(_) => {
                self.alert = Some(DECISION_FAILED_ALERT.to_string());
            }
        }
    }

    /// Apply a change-feed message to the local feedback list
    pub fn apply(&mut self, message: FeedMessage) {
        match message {
            FeedMessage::Snapshot { feedback } => self.feedback = feedback,
            FeedMessage::Change { change } => apply_change(&mut self.feedback, change),
        }
    }
}
