use shared::models::{Submission, SubmissionCreate};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert(
    pool: &PgPool,
    id: Uuid,
    data: &SubmissionCreate,
    now: i64,
) -> Result<Submission, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO submissions (
            id, user_id, full_name, phone_number, location, email, hobbies,
            profile_picture_key, source_code_key, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(data.user_id)
    .bind(&data.full_name)
    .bind(&data.phone_number)
    .bind(&data.location)
    .bind(&data.email)
    .bind(&data.hobbies)
    .bind(&data.profile_picture_key)
    .bind(&data.source_code_key)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM submissions ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM submissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
