/// Token service
///
/// Issues and validates the three scoped token kinds. One mechanism
/// (signed claims + scope discriminator) covers access, refresh, and
/// email-confirmation tokens; the per-scope default TTLs come from
/// configuration.

use chrono::Duration;
use std::sync::Arc;

use crate::auth::claims::{Claims, TokenScope};
use crate::auth::codec::{JwtCodec, TokenCodec};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

#[derive(Clone)]
pub struct TokenService {
    codec: Arc<dyn TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
    confirmation_ttl: Duration,
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self::with_codec(settings, Arc::new(JwtCodec::new(settings.secret.clone())))
    }

    /// Constructor taking an explicit codec, for tests that substitute a
    /// fake one.
    pub fn with_codec(settings: &JwtSettings, codec: Arc<dyn TokenCodec>) -> Self {
        Self {
            codec,
            access_ttl: Duration::seconds(settings.access_token_expiry),
            refresh_ttl: Duration::seconds(settings.refresh_token_expiry),
            confirmation_ttl: Duration::seconds(settings.confirmation_token_expiry),
        }
    }

    fn default_ttl(&self, scope: TokenScope) -> Duration {
        match scope {
            TokenScope::Access => self.access_ttl,
            TokenScope::Refresh => self.refresh_ttl,
            TokenScope::EmailConfirmation => self.confirmation_ttl,
        }
    }

    /// Signs a claims set for `subject`. `ttl` falls back to the scope's
    /// configured default. Pure computation, no side effects.
    pub fn issue(
        &self,
        subject: &str,
        scope: TokenScope,
        ttl: Option<Duration>,
    ) -> Result<String, AppError> {
        let claims = Claims::new(subject, scope, ttl.unwrap_or_else(|| self.default_ttl(scope)));
        self.codec
            .encode(&claims)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Decodes and verifies a token, then checks its scope against what
    /// the caller expects. Codec failures (malformed, expired, bad
    /// signature) become `InvalidToken`; a well-formed token with the
    /// wrong scope becomes `ScopeMismatch`. Returns the subject.
    pub fn validate(&self, token: &str, expected: TokenScope) -> Result<String, AppError> {
        let claims = self.codec.decode(token).map_err(|e| {
            tracing::warn!(error = %e, "Token decode failed");
            AppError::Auth(AuthError::InvalidToken)
        })?;

        if claims.scope != expected {
            tracing::warn!(
                presented = ?claims.scope,
                expected = ?expected,
                "Token scope mismatch"
            );
            return Err(AppError::Auth(AuthError::ScopeMismatch));
        }

        Ok(claims.sub)
    }

    pub fn issue_access(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, TokenScope::Access, None)
    }

    pub fn issue_refresh(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, TokenScope::Refresh, None)
    }

    pub fn issue_confirmation(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, TokenScope::EmailConfirmation, None)
    }

    pub fn validate_access(&self, token: &str) -> Result<String, AppError> {
        self.validate(token, TokenScope::Access)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<String, AppError> {
        self.validate(token, TokenScope::Refresh)
    }

    pub fn validate_confirmation(&self, token: &str) -> Result<String, AppError> {
        self.validate(token, TokenScope::EmailConfirmation)
    }
}
