/// Transactional email client
///
/// Posts messages to a REST mail endpoint. Confirmation mail is sent from
/// a spawned task; a failure is logged and never fails the originating
/// request.

use serde::Serialize;

use crate::auth::TokenService;
use crate::error::{AppError, EmailError};

#[derive(Clone)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: String,
    sender: String,
}

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: String,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(base_url: String, sender: String, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            base_url,
            sender,
        }
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html_content: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/email", self.base_url);
        let request = SendEmailRequest {
            from: self.sender.clone(),
            to: recipient.to_string(),
            subject: subject.to_string(),
            html: html_content.to_string(),
        };

        self.http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Email(EmailError::ServiceUnavailable(e.to_string())))?
            .error_for_status()
            .map_err(|e| AppError::Email(EmailError::SendFailed(e.to_string())))?;

        Ok(())
    }

    /// Issues an email-confirmation token for `email` and mails the
    /// confirmation link.
    pub async fn send_confirmation(
        &self,
        tokens: &TokenService,
        email: &str,
        username: &str,
        app_base_url: &str,
    ) -> Result<(), AppError> {
        let token = tokens.issue_confirmation(email)?;
        let link = format!("{}/api/auth/confirmed_email/{}", app_base_url, token);
        let html = confirmation_body(username, &link);

        self.send_email(email, "Please confirm your email address", &html)
            .await
    }
}

fn confirmation_body(username: &str, link: &str) -> String {
    format!(
        "<h1>Welcome, {}!</h1>\
         <p>Please confirm your email address by following \
         <a href=\"{}\">this link</a>.</p>\
         <p>The link is valid for 7 days. If you did not sign up, ignore this message.</p>",
        username, link
    )
}
