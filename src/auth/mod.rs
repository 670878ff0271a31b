/// Authentication module
///
/// Scoped JWT issuing/validation, password hashing, and the auth service
/// orchestrating login, refresh-token rotation, caller identification,
/// and email confirmation.

mod claims;
mod codec;
mod password;
mod service;
mod token;

pub use claims::{Claims, TokenScope};
pub use codec::{CodecError, JwtCodec, TokenCodec};
pub use password::hash_password;
pub use password::verify_password;
pub use service::AuthService;
pub use token::TokenService;
