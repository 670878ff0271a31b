/// Token claims
///
/// The signed payload carried by every token: subject (user email),
/// issue/expiry timestamps, and a scope discriminator. Three token kinds
/// share this one structure; the scope field is what keeps an
/// email-confirmation token from ever authorizing an API call.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a token is allowed to authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenScope {
    #[serde(rename = "access_token")]
    Access,
    #[serde(rename = "refresh_token")]
    Refresh,
    #[serde(rename = "email_confirmation_token")]
    EmailConfirmation,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's email
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token id. Timestamps have whole-second resolution, so without it
    /// two tokens issued for one subject in the same second would be
    /// byte-identical; a rotated refresh token must never equal the one
    /// it replaces.
    pub jti: Uuid,
    pub scope: TokenScope,
}

impl Claims {
    /// Claims expiring `ttl` from now.
    pub fn new(subject: &str, scope: TokenScope, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: subject.to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
            jti: Uuid::new_v4(),
            scope,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}
