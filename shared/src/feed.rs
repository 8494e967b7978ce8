//! Feedback change feed protocol
//!
//! Cloud → Evaluator: FeedMessage (snapshot, then row-level changes)
//!
//! Clients keep a local feedback list and patch it with
//! [`apply_change`]: insert appends, update replaces by id, delete
//! removes by id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Feedback;

/// Row-level change on the feedback table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackChange {
    Insert { record: Feedback },
    Update { record: Feedback },
    Delete { id: Uuid },
}

impl FeedbackChange {
    /// Id of the affected row
    pub fn id(&self) -> Uuid {
        match self {
            FeedbackChange::Insert { record } | FeedbackChange::Update { record } => record.id,
            FeedbackChange::Delete { id } => *id,
        }
    }
}

/// Cloud → Evaluator push message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedMessage {
    /// Sent on connect and after the subscriber fell behind: full feedback list
    Snapshot { feedback: Vec<Feedback> },
    /// A single row-level change
    Change { change: FeedbackChange },
}

/// Apply one change to a local feedback list.
///
/// An update for an id that is not present leaves the list unchanged, as
/// does a delete for an unknown id.
pub fn apply_change(list: &mut Vec<Feedback>, change: FeedbackChange) {
    match change {
        FeedbackChange::Insert { record } => list.push(record),
        FeedbackChange::Update { record } => {
            if let Some(slot) = list.iter_mut().find(|f| f.id == record.id) {
                *slot = record;
            }
        }
        FeedbackChange::Delete { id } => list.retain(|f| f.id != id),
    }
}
