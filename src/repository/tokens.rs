/// Refresh token store
///
/// Rows are keyed by the SHA-256 digest of the token string; plaintext
/// tokens never touch the database. A token is consumed (deleted) the
/// moment the refresh flow presents it, in the same statement that reads
/// it, so two concurrent refreshes with the same token can yield at most
/// one success.

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::RefreshTokenRecord;
use crate::error::AppError;

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub async fn save(pool: &PgPool, user_id: Uuid, token: &str) -> Result<(), AppError> {
    let record = RefreshTokenRecord {
        id: Uuid::new_v4(),
        user_id,
        token_hash: hash_token(token),
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(&record.token_hash)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Deletes the record matching the presented token and returns its owner,
/// or None when no record exists. DELETE .. RETURNING is a single atomic
/// statement: under concurrent presentation of the same token, exactly
/// one caller observes the row.
pub async fn consume(pool: &PgPool, token: &str) -> Result<Option<Uuid>, AppError> {
    let owner = sqlx::query_scalar::<_, Uuid>(
        r#"
        DELETE FROM refresh_tokens WHERE token_hash = $1 RETURNING user_id
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?;

    Ok(owner)
}
