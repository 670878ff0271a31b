use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::User;
use crate::error::AppError;

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

/// Looks a user up by email or username. Login accepts either.
pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, avatar, created_at, confirmed_at
        FROM users
        WHERE email = $1 OR username = $1
        "#,
    )
    .bind(login)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, avatar, created_at, confirmed_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Inserts a new, unconfirmed user.
pub async fn insert(pool: &PgPool, new_user: NewUser) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash, avatar, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, username, email, password_hash, avatar, created_at, confirmed_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.avatar)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Stamps the user's email as confirmed.
pub async fn set_confirmed(pool: &PgPool, email: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE users SET confirmed_at = $1 WHERE email = $2
        "#,
    )
    .bind(Utc::now())
    .bind(email)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_avatar(pool: &PgPool, user_id: Uuid, url: &str) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET avatar = $1 WHERE id = $2
        RETURNING id, username, email, password_hash, avatar, created_at, confirmed_at
        "#,
    )
    .bind(url)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
