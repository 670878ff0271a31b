/// Token codec seam
///
/// Signing and parsing are hidden behind a two-method trait with one
/// designated error kind, so the token service can be exercised against a
/// fake codec in tests. The production implementation is HS256 JWT via
/// `jsonwebtoken`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::auth::claims::Claims;

/// The single failure kind a codec may signal: malformed input, bad
/// signature, or expired claims all collapse into this.
#[derive(Debug, Clone)]
pub struct CodecError(pub String);

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token codec error: {}", self.0)
    }
}

impl std::error::Error for CodecError {}

pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &Claims) -> Result<String, CodecError>;
    fn decode(&self, token: &str) -> Result<Claims, CodecError>;
}

/// HS256 JWT codec.
pub struct JwtCodec {
    secret: String,
}

impl JwtCodec {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }
}

impl TokenCodec for JwtCodec {
    fn encode(&self, claims: &Claims) -> Result<String, CodecError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CodecError(e.to_string()))
    }

    fn decode(&self, token: &str) -> Result<Claims, CodecError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the default 60s leeway would let just-expired
        // tokens through.
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| CodecError(e.to_string()))
    }
}
