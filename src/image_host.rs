/// Image host client
///
/// Uploads avatar images to a third-party image host and returns the
/// hosted URL. Also builds the Gravatar-style default avatar used at
/// signup.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::configuration::ImageHostSettings;
use crate::error::AppError;

#[derive(Clone)]
pub struct ImageHost {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    folder: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl ImageHost {
    pub fn new(settings: &ImageHostSettings, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            folder: settings.folder.clone(),
        }
    }

    /// Uploads image bytes under a stable per-user public id, so a new
    /// avatar replaces the previous one. Returns the hosted URL.
    pub async fn upload(&self, bytes: Vec<u8>, public_id: &str) -> Result<String, AppError> {
        let url = format!("{}/upload", self.base_url);
        let form = reqwest::multipart::Form::new()
            .text("public_id", format!("{}/{}", self.folder, public_id))
            .part("file", reqwest::multipart::Part::bytes(bytes));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Upload(e.to_string()))?
            .json::<UploadResponse>()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        Ok(response.secure_url)
    }
}

/// Gravatar URL for an email address (SHA-256 variant), used as the
/// default avatar at signup.
pub fn gravatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{:x}?d=identicon",
        hasher.finalize()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravatar_url_is_stable_and_case_insensitive() {
        let a = gravatar_url("Tony.Stark@mail.com");
        let b = gravatar_url("tony.stark@mail.com  ");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
    }

    #[test]
    fn different_emails_get_different_avatars() {
        assert_ne!(gravatar_url("a@mail.com"), gravatar_url("b@mail.com"));
    }
}
