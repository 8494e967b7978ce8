use shared::models::{Feedback, FeedbackCreate, OwnFeedback};
use sqlx::PgPool;
use uuid::Uuid;

/// Append one feedback row. The table trigger announces it on the change feed.
pub async fn insert(
    pool: &PgPool,
    id: Uuid,
    data: &FeedbackCreate,
    now: i64,
) -> Result<Feedback, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO feedback (id, submission_id, evaluator_id, decision, comments, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.submission_id)
    .bind(data.evaluator_id)
    .bind(data.decision.as_str())
    .bind(&data.comments)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Feedback>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM feedback WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM feedback ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
}

/// Feedback on submissions owned by `user_id` (inner join, so nothing else leaks)
pub async fn list_for_owner(pool: &PgPool, user_id: Uuid) -> Result<Vec<OwnFeedback>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT f.submission_id, f.decision, f.comments, f.created_at
        FROM feedback f
        INNER JOIN submissions s ON s.id = f.submission_id
        WHERE s.user_id = $1
        ORDER BY f.created_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
