/// Auth service
///
/// Orchestrates the four authentication flows over the token service and
/// the auth store: login, refresh-token rotation, caller identification,
/// and email confirmation. All failures are terminal for the request.

use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::domain::{TokenPair, User};
use crate::error::{AppError, AuthError};
use crate::repository::AuthStore;

#[derive(Clone)]
pub struct AuthService {
    tokens: TokenService,
    store: Arc<dyn AuthStore>,
}

impl AuthService {
    pub fn new(tokens: TokenService, store: Arc<dyn AuthStore>) -> Self {
        Self { tokens, store }
    }

    /// The token service, for callers issuing confirmation tokens.
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Login. Unknown account and wrong password collapse into the same
    /// `InvalidCredentials`; an unconfirmed account fails with
    /// `UnconfirmedEmail`. On success a fresh access/refresh pair is
    /// issued and the refresh token persisted.
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self.store.find_user(login).await?;

        let user = match user {
            Some(user) if crate::auth::verify_password(password, &user.password_hash) => user,
            _ => return Err(AppError::Auth(AuthError::InvalidCredentials)),
        };

        if !user.is_confirmed() {
            return Err(AppError::Auth(AuthError::UnconfirmedEmail));
        }

        let pair = self.generate_pair(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    /// Token rotation. The stored record is consumed the moment it is
    /// found, before ownership is checked, so a replayed or stolen token
    /// can never succeed twice even when the rest of validation fails.
    /// Success requires the record to have existed and its owner to match
    /// the decoded subject.
    pub async fn refresh(&self, presented: &str) -> Result<TokenPair, AppError> {
        let subject = self.tokens.validate_refresh(presented)?;

        let user = self.store.find_user_by_email(&subject).await?;
        // Consume unconditionally: the delete happens whether or not the
        // ownership check below passes.
        let owner = self.store.consume_refresh_token(presented).await?;

        let user = match (user, owner) {
            (Some(user), Some(owner_id)) if owner_id == user.id => user,
            _ => {
                tracing::warn!("Refresh token rejected: record missing or owner mismatch");
                return Err(AppError::Auth(AuthError::InvalidRefreshToken));
            }
        };

        let pair = self.generate_pair(&user).await?;
        tracing::info!(user_id = %user.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Per-request caller identity. Decodes the bearer token with access
    /// scope and resolves the subject to a user.
    pub async fn identify(&self, access_token: &str) -> Result<User, AppError> {
        let subject = self.tokens.validate_access(access_token)?;

        self.store
            .find_user_by_email(&subject)
            .await?
            .ok_or(AppError::Auth(AuthError::Unauthorized))
    }

    /// Resolves the subject of an email-confirmation token without side
    /// effects. The route layer decides whether confirmation is needed.
    pub async fn confirmation_subject(&self, token: &str) -> Result<String, AppError> {
        self.tokens.validate_confirmation(token)
    }

    /// Stamps the token's subject as confirmed.
    pub async fn confirm(&self, token: &str) -> Result<(), AppError> {
        let email = self.tokens.validate_confirmation(token)?;
        self.store.mark_confirmed(&email).await?;
        tracing::info!("Email confirmed");
        Ok(())
    }

    async fn generate_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        let access_token = self.tokens.issue_access(&user.email)?;
        let refresh_token = self.tokens.issue_refresh(&user.email)?;
        self.store.save_refresh_token(user.id, &refresh_token).await?;
        Ok(TokenPair::bearer(access_token, refresh_token))
    }
}
