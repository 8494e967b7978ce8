//! Database access layer
//!
//! Handlers talk to the store traits below; [`PgStore`] backs them with
//! PostgreSQL and [`memory::MemoryStore`] with in-process tables.

pub mod feedback;
pub mod memory;
pub mod submissions;
pub mod users;

use async_trait::async_trait;
use shared::error::AppError;
use shared::models::{
    Feedback, FeedbackCreate, OwnFeedback, Role, Submission, SubmissionCreate,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::BoxError;
pub use users::UserRecord;

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert an account; a taken email fails with `AppError::already_exists`
    async fn create(&self, user: UserRecord) -> Result<(), BoxError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, BoxError>;
    /// Stored role for the id, `None` if the user row does not exist
    async fn find_role(&self, id: Uuid) -> Result<Option<Role>, BoxError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(&self, data: SubmissionCreate) -> Result<Submission, BoxError>;
    async fn list_all(&self) -> Result<Vec<Submission>, BoxError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, BoxError>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert(&self, data: FeedbackCreate) -> Result<Feedback, BoxError>;
    async fn list_all(&self) -> Result<Vec<Feedback>, BoxError>;
    async fn list_for_owner(&self, user_id: Uuid) -> Result<Vec<OwnFeedback>, BoxError>;
}

/// PostgreSQL-backed stores
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: UserRecord) -> Result<(), BoxError> {
        match users::create(&self.pool, &user).await {
            Ok(()) => Ok(()),
            // Lost a signup race: the UNIQUE(email) constraint caught it
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(Box::new(AppError::already_exists("Account")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, BoxError> {
        Ok(users::find_by_email(&self.pool, email).await?)
    }

    async fn find_role(&self, id: Uuid) -> Result<Option<Role>, BoxError> {
        Ok(users::find_role(&self.pool, id).await?)
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn insert(&self, data: SubmissionCreate) -> Result<Submission, BoxError> {
        Ok(submissions::insert(&self.pool, Uuid::new_v4(), &data, now_millis()).await?)
    }

    async fn list_all(&self) -> Result<Vec<Submission>, BoxError> {
        Ok(submissions::list_all(&self.pool).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Submission>, BoxError> {
        Ok(submissions::find_by_id(&self.pool, id).await?)
    }
}

#[async_trait]
impl FeedbackStore for PgStore {
    async fn insert(&self, data: FeedbackCreate) -> Result<Feedback, BoxError> {
        Ok(feedback::insert(&self.pool, Uuid::new_v4(), &data, now_millis()).await?)
    }

    async fn list_all(&self) -> Result<Vec<Feedback>, BoxError> {
        Ok(feedback::list_all(&self.pool).await?)
    }

    async fn list_for_owner(&self, user_id: Uuid) -> Result<Vec<OwnFeedback>, BoxError> {
        Ok(feedback::list_for_owner(&self.pool, user_id).await?)
    }
}
