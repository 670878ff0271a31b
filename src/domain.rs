/// Domain records
///
/// Plain data structs shared by the repositories, the auth service, and
/// the route layer. Persistence stays in `repository`; nothing here talks
/// to the database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered account. `confirmed_at` is `None` until the user follows
/// the emailed confirmation link.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }
}

/// A contact book entry, owned by exactly one user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub extra: Option<String>,
}

/// Stored refresh token row. Only the SHA-256 digest of the token string
/// is persisted; the plaintext lives on the client.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Access + refresh token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_user_is_unconfirmed() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ironman".to_string(),
            email: "tony.stark@mail.com".to_string(),
            password_hash: "$2b$12$abc".to_string(),
            avatar: None,
            created_at: Utc::now(),
            confirmed_at: None,
        };
        assert!(!user.is_confirmed());
    }

    #[test]
    fn token_pair_is_bearer() {
        let pair = TokenPair::bearer("a".to_string(), "r".to_string());
        assert_eq!(pair.token_type, "bearer");
    }
}
