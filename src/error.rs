/// Unified error handling
///
/// Domain-specific error enums rolled up into a single `AppError` that
/// route handlers return. `AppError` implements `ResponseError`, so every
/// handler can use `?` and the HTTP mapping lives in one place.
///
/// Authentication failures deliberately carry fixed, non-leaking
/// messages: a wrong password and an unknown account produce the same
/// response body.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Input validation errors.
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Persistence errors.
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::ConnectionPool(msg) => {
                write!(f, "Database connection error: {}", msg)
            }
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Authentication failures. All of these are terminal for the request and
/// map to 401 at the route boundary. `InvalidToken` and `ScopeMismatch`
/// share an HTTP response but stay distinct variants: a structurally
/// broken token and a well-formed token presented for the wrong purpose
/// are different conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown account or wrong password. One variant for both, so the
    /// response does not reveal which part was wrong.
    InvalidCredentials,
    /// The account exists but its email was never confirmed.
    UnconfirmedEmail,
    /// Malformed, expired, or tampered token.
    InvalidToken,
    /// Token decoded fine but its scope does not authorize this call.
    ScopeMismatch,
    /// Refresh token decoded but the stored record is missing or belongs
    /// to a different user.
    InvalidRefreshToken,
    /// Generic caller-identity failure on a protected endpoint.
    Unauthorized,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::UnconfirmedEmail => write!(f, "Email not confirmed"),
            AuthError::InvalidToken => write!(f, "Could not validate credentials"),
            AuthError::ScopeMismatch => write!(f, "Invalid scope for token"),
            AuthError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            AuthError::Unauthorized => write!(f, "Could not validate credentials"),
        }
    }
}

impl StdError for AuthError {}

/// Transactional email errors. These never fail a request; confirmation
/// mail is fire-and-forget.
#[derive(Debug, Clone)]
pub enum EmailError {
    SendFailed(String),
    ServiceUnavailable(String),
}

impl fmt::Display for EmailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailError::SendFailed(msg) => write!(f, "Failed to send email: {}", msg),
            EmailError::ServiceUnavailable(msg) => {
                write!(f, "Email service unavailable: {}", msg)
            }
        }
    }
}

impl StdError for EmailError {}

/// Central application error. Route handlers return
/// `Result<HttpResponse, AppError>`.
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Email(EmailError),
    Upload(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Email(e) => write!(f, "{}", e),
            AppError::Upload(msg) => write!(f, "Upload failed: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        AppError::Email(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Record already exists".to_string(),
            ))
        } else if error_msg.contains("no rows") {
            AppError::Database(DatabaseError::NotFound("Record not found".to_string()))
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            AppError::Database(DatabaseError::ConnectionPool(error_msg))
        } else {
            AppError::Database(DatabaseError::UnexpectedError(error_msg))
        }
    }
}

/// Error body returned to clients.
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    pub status: u16,
}

impl AppError {
    /// HTTP status, machine code, and client-facing message. Internal
    /// details never reach the response body.
    fn http_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(msg)) => {
                (StatusCode::CONFLICT, "DUPLICATE_ENTRY", msg.clone())
            }
            AppError::Database(DatabaseError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone())
            }
            AppError::Database(DatabaseError::ConnectionPool(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Database temporarily unavailable".to_string(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Database error occurred".to_string(),
            ),
            AppError::Auth(e) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", e.to_string()),
            AppError::Email(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "EMAIL_SERVICE_ERROR",
                "Email service temporarily unavailable".to_string(),
            ),
            AppError::Upload(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "UPLOAD_ERROR",
                "Image upload temporarily unavailable".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => tracing::warn!(error = %e, "Validation error"),
            AppError::Auth(e) => tracing::warn!(error = ?e, "Authentication denied"),
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(error = %self, "Duplicate entry attempt")
            }
            AppError::Database(e) => tracing::error!(error = %e, "Database error"),
            AppError::Email(e) => tracing::error!(error = %e, "Email service error"),
            AppError::Upload(e) => tracing::error!(error = %e, "Image upload error"),
            AppError::Internal(e) => tracing::error!(error = %e, "Internal error"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.http_parts().0
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        let (status, code, message) = self.http_parts();
        HttpResponse::build(status).json(ErrorResponse {
            message,
            code: code.to_string(),
            status: status.as_u16(),
        })
    }
}
