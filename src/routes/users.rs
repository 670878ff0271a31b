/// User routes
///
/// Both endpoints sit behind the auth guard, which resolves the bearer
/// token to a `User` and injects it as request data.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::User;
use crate::error::{AppError, ValidationError};
use crate::image_host::ImageHost;
use crate::repository::users;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/users
pub async fn current_user(user: web::ReqData<User>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(&*user)))
}

/// PATCH /api/users/avatar
///
/// Accepts a multipart image upload, pushes it to the image host, and
/// stores the returned URL on the user. The upload result is the
/// response, so this call is synchronous.
pub async fn update_avatar(
    user: web::ReqData<User>,
    mut payload: Multipart,
    pool: web::Data<PgPool>,
    image_host: web::Data<ImageHost>,
) -> Result<HttpResponse, AppError> {
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::Validation(ValidationError::InvalidFormat(e.to_string())))?
    {
        let mut buffer = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::Validation(ValidationError::InvalidFormat(e.to_string())))?
        {
            buffer.extend_from_slice(&chunk);
        }
        bytes = Some(buffer);
        // Only the first file part matters.
        break;
    }

    let bytes = bytes
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation(ValidationError::EmptyField("file".to_string())))?;

    let url = image_host.upload(bytes, &user.username).await?;
    let updated = users::update_avatar(pool.get_ref(), user.id, &url).await?;

    tracing::info!(user_id = %updated.id, "Avatar updated");

    Ok(HttpResponse::Ok().json(UserResponse::from(&updated)))
}
