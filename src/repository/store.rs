/// Persistence seams
///
/// The auth service and the contact routes see these traits instead of
/// `PgPool`, so login, refresh rotation, identification, confirmation,
/// and the contact endpoints can all be tested against in-memory
/// stores. `PgStore` is the production implementation of both,
/// delegating to the repository modules.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Contact, User};
use crate::error::AppError;
use crate::repository::{contacts, tokens, users};
use crate::repository::contacts::ContactData;

#[async_trait]
pub trait AuthStore: Send + Sync {
    /// User by email or username.
    async fn find_user(&self, login: &str) -> Result<Option<User>, AppError>;

    /// User by email only (token subjects are emails).
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Persists a refresh token record owned by `user_id`.
    async fn save_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;

    /// Deletes the record for the presented token and returns its owner,
    /// or None when no record existed. Must be atomic with respect to
    /// concurrent presentations of the same token.
    async fn consume_refresh_token(&self, token: &str) -> Result<Option<Uuid>, AppError>;

    /// Sets the user's email-confirmation timestamp to now.
    async fn mark_confirmed(&self, email: &str) -> Result<(), AppError>;
}

/// Contact persistence, always scoped to an owning user. A contact that
/// exists but belongs to someone else reads as absent.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn list(
        &self,
        user_id: Uuid,
        q: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Contact>, AppError>;

    async fn create(&self, user_id: Uuid, data: ContactData) -> Result<Contact, AppError>;

    async fn read(&self, user_id: Uuid, id: Uuid) -> Result<Option<Contact>, AppError>;

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        data: ContactData,
    ) -> Result<Option<Contact>, AppError>;

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<Option<Contact>, AppError>;

    async fn upcoming_birthdays(
        &self,
        user_id: Uuid,
        days: i32,
    ) -> Result<Vec<Contact>, AppError>;
}

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
impl AuthStore for PgStore {
    async fn find_user(&self, login: &str) -> Result<Option<User>, AppError> {
        users::find_by_login(&self.pool, login).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        users::find_by_email(&self.pool, email).await
    }

    async fn save_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        tokens::save(&self.pool, user_id, token).await
    }

    async fn consume_refresh_token(&self, token: &str) -> Result<Option<Uuid>, AppError> {
        tokens::consume(&self.pool, token).await
    }

    async fn mark_confirmed(&self, email: &str) -> Result<(), AppError> {
        users::set_confirmed(&self.pool, email).await
    }
}

#[async_trait]
impl ContactStore for PgStore {
    async fn list(
        &self,
        user_id: Uuid,
        q: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Contact>, AppError> {
        contacts::list(&self.pool, user_id, q, skip, limit).await
    }

    async fn create(&self, user_id: Uuid, data: ContactData) -> Result<Contact, AppError> {
        contacts::create(&self.pool, user_id, data).await
    }

    async fn read(&self, user_id: Uuid, id: Uuid) -> Result<Option<Contact>, AppError> {
        contacts::read(&self.pool, user_id, id).await
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        data: ContactData,
    ) -> Result<Option<Contact>, AppError> {
        contacts::update(&self.pool, user_id, id, data).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<Option<Contact>, AppError> {
        contacts::delete(&self.pool, user_id, id).await
    }

    async fn upcoming_birthdays(
        &self,
        user_id: Uuid,
        days: i32,
    ) -> Result<Vec<Contact>, AppError> {
        contacts::upcoming_birthdays(&self.pool, user_id, days).await
    }
}
