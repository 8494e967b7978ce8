//! In-process stores for local development and tests
//!
//! Unlike PostgreSQL there is no table trigger, so feedback writes are
//! published to the [`FeedbackHub`] directly.

use async_trait::async_trait;
use shared::error::AppError;
use shared::feed::FeedbackChange;
use shared::models::{
    Feedback, FeedbackCreate, OwnFeedback, Role, Submission, SubmissionCreate,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FeedbackStore, SubmissionStore, UserRecord, UserStore, now_millis};
use crate::error::BoxError;
use crate::live::FeedbackHub;

pub struct MemoryStore {
    users: RwLock<Vec<UserRecord>>,
    submissions: RwLock<Vec<Submission>>,
    feedback: RwLock<Vec<Feedback>>,
    hub: FeedbackHub,
}

impl MemoryStore {
    pub fn new(hub: FeedbackHub) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            submissions: RwLock::new(Vec::new()),
            feedback: RwLock::new(Vec::new()),
            hub,
        }
    }

    /// Remove a feedback row out-of-band (moderation, fixtures) and announce it
    pub async fn delete_feedback(&self, id: Uuid) -> bool {
        let mut rows = self.feedback.write().await;
        let before = rows.len();
        rows.retain(|f| f.id != id);
        let removed = rows.len() != before;
        if removed {
            self.hub.publish(FeedbackChange::Delete { id });
        }
        removed
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: UserRecord) -> Result<(), BoxError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(Box::new(AppError::already_exists("Account")));
        }
        users.push(user);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, BoxError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_role(&self, id: Uuid) -> Result<Option<Role>, BoxError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).map(|u| u.role))
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert(&self, data: SubmissionCreate) -> Result<Submission, BoxError> {
        let row = Submission {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            full_name: data.full_name,
            phone_number: data.phone_number,
            location: data.location,
            email: data.email,
            hobbies: data.hobbies,
            profile_picture_key: data.profile_picture_key,
            source_code_key: data.source_code_key,
            created_at: now_millis(),
        };
        self.submissions.write().await.push(row.clone());
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Submission>, BoxError> {
        Ok(self.submissions.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, BoxError> {
        let rows = self.submissions.read().await;
        Ok(rows.iter().find(|s| s.id == id).cloned())
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert(&self, data: FeedbackCreate) -> Result<Feedback, BoxError> {
        let row = Feedback {
            id: Uuid::new_v4(),
            submission_id: data.submission_id,
            evaluator_id: data.evaluator_id,
            decision: data.decision,
            comments: data.comments,
            created_at: now_millis(),
        };
        self.feedback.write().await.push(row.clone());
        self.hub.publish(FeedbackChange::Insert {
            record: row.clone(),
        });
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, BoxError> {
        Ok(self.feedback.read().await.clone())
    }

    async fn list_for_owner(&self, user_id: Uuid) -> Result<Vec<OwnFeedback>, BoxError> {
        let owned: Vec<Uuid> = self
            .submissions
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id)
            .collect();
        let rows = self.feedback.read().await;
        Ok(rows
            .iter()
            .filter(|f| owned.contains(&f.submission_id))
            .map(|f| OwnFeedback {
                submission_id: f.submission_id,
                decision: f.decision,
                comments: f.comments.clone(),
                created_at: f.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::FeedEvent;
    use shared::models::Decision;

    fn submission_for(user_id: Uuid) -> SubmissionCreate {
        SubmissionCreate {
            user_id,
            full_name: "Ada".into(),
            phone_number: "555".into(),
            location: "London".into(),
            email: "ada@example.com".into(),
            hobbies: "chess".into(),
            profile_picture_key: "profile-pic-1".into(),
            source_code_key: "source-code-1.zip".into(),
        }
    }

    #[tokio::test]
    async fn owner_only_sees_own_feedback() {
        let store = MemoryStore::new(FeedbackHub::new());
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let a = SubmissionStore::insert(&store, submission_for(alice)).await.unwrap();
        let b = SubmissionStore::insert(&store, submission_for(bob)).await.unwrap();

        for submission_id in [a.id, b.id, b.id] {
            FeedbackStore::insert(
                &store,
                FeedbackCreate {
                    submission_id,
                    evaluator_id: Uuid::new_v4(),
                    decision: Decision::Rejected,
                    comments: "no".into(),
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(store.list_for_owner(alice).await.unwrap().len(), 1);
        assert_eq!(store.list_for_owner(bob).await.unwrap().len(), 2);
        assert!(store.list_for_owner(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_are_published() {
        let hub = FeedbackHub::new();
        let mut sub = hub.subscribe();
        let store = MemoryStore::new(hub);

        let row = FeedbackStore::insert(
            &store,
            FeedbackCreate {
                submission_id: Uuid::new_v4(),
                evaluator_id: Uuid::new_v4(),
                decision: Decision::Accepted,
                comments: "Great work".into(),
            },
        )
        .await
        .unwrap();

        match sub.next().await {
            Some(FeedEvent::Change(FeedbackChange::Insert { record })) => {
                assert_eq!(record, row)
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert!(store.delete_feedback(row.id).await);
        assert!(!store.delete_feedback(row.id).await);
        match sub.next().await {
            Some(FeedEvent::Change(FeedbackChange::Delete { id })) => assert_eq!(id, row.id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new(FeedbackHub::new());
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            hashed_password: "x".into(),
            role: Role::Developer,
            created_at: 0,
        };
        store.create(record.clone()).await.unwrap();
        assert!(store.create(record.clone()).await.is_err());
        assert_eq!(store.find_role(record.id).await.unwrap(), Some(Role::Developer));
    }
}
