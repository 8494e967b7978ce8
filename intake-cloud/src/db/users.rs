use shared::models::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Account row including the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: i64,
}

impl UserRecord {
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

pub async fn create(pool: &PgPool, user: &UserRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, hashed_password, role, created_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.hashed_password)
    .bind(user.role.as_str())
    .bind(user.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Stored role for a user id; `None` when no row exists
pub async fn find_role(pool: &PgPool, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    role.map(|r| r.parse::<Role>().map_err(|e| sqlx::Error::Decode(e.into())))
        .transpose()
}
