/// Authentication routes
///
/// Signup, login, token refresh, and the email-confirmation pair. The
/// confirmation email is sent from a spawned task; its failure is logged
/// and never fails the request that triggered it.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{hash_password, AuthService};
use crate::configuration::ApplicationSettings;
use crate::email_client::EmailClient;
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::image_host::gravatar_url;
use crate::repository::users::{self, NewUser};
use crate::routes::users::UserResponse;
use crate::validators::{is_valid_email, is_valid_password, is_valid_username};

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// OAuth2-style password form: the `username` field carries the email or
/// username.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct RequestEmailBody {
    pub email: String,
}

fn spawn_confirmation_email(
    email_client: EmailClient,
    auth: AuthService,
    email: String,
    username: String,
    base_url: String,
) {
    tokio::spawn(async move {
        if let Err(e) = email_client
            .send_confirmation(auth.tokens(), &email, &username, &base_url)
            .await
        {
            tracing::error!(error = %e, "Failed to send confirmation email");
        }
    });
}

/// POST /api/auth/signup
///
/// Creates an unconfirmed user with a Gravatar default avatar and kicks
/// off the confirmation email. 409 when the email is already registered.
pub async fn signup(
    body: web::Json<SignupRequest>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthService>,
    email_client: web::Data<EmailClient>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let username = is_valid_username(&body.username)?;
    let email = is_valid_email(&body.email)?;
    is_valid_password(&body.password)?;

    if users::find_by_email(pool.get_ref(), &email).await?.is_some() {
        return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
            "User already exists".to_string(),
        )));
    }

    let password_hash = hash_password(&body.password)?;
    let user = users::insert(
        pool.get_ref(),
        NewUser {
            username,
            email,
            password_hash,
            avatar: Some(gravatar_url(&body.email)),
        },
    )
    .await?;

    spawn_confirmation_email(
        email_client.get_ref().clone(),
        auth.get_ref().clone(),
        user.email.clone(),
        user.username.clone(),
        app.base_url.clone(),
    );

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// POST /api/auth/login
pub async fn login(
    form: web::Form<LoginForm>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = auth.authenticate(&form.username, &form.password).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// POST /api/auth/refresh
pub async fn refresh(
    body: web::Json<RefreshRequest>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let pair = auth.refresh(&body.refresh_token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// GET /api/auth/confirmed_email/{token}
///
/// The already-confirmed short-circuit lives here, not in the service,
/// so a repeated click on the emailed link stays a read-only request.
pub async fn confirm_email(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let token = path.into_inner();
    let email = auth.confirmation_subject(&token).await?;

    let user = users::find_by_email(pool.get_ref(), &email)
        .await?
        .ok_or_else(|| {
            AppError::Validation(ValidationError::InvalidFormat(
                "confirmation token".to_string(),
            ))
        })?;

    if user.is_confirmed() {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Your email is already confirmed"
        })));
    }

    auth.confirm(&token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Email confirmed!"
    })))
}

/// POST /api/auth/request_email
///
/// Re-sends the confirmation email. Unknown addresses get the same
/// "check your email" reply as unconfirmed accounts, so the endpoint
/// does not reveal which addresses are registered; already-confirmed
/// accounts are told so instead of being mailed again.
pub async fn request_email(
    body: web::Json<RequestEmailBody>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthService>,
    email_client: web::Data<EmailClient>,
    app: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&body.email)?;

    if let Some(user) = users::find_by_email(pool.get_ref(), &email).await? {
        if user.is_confirmed() {
            return Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Your email is already confirmed"
            })));
        }
        spawn_confirmation_email(
            email_client.get_ref().clone(),
            auth.get_ref().clone(),
            user.email.clone(),
            user.username.clone(),
            app.base_url.clone(),
        );
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Check your email for confirmation"
    })))
}
