use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

/// Transactional email client backed by the Resend HTTP API.
///
/// Delivery failures are returned as values; callers decide what state to
/// unwind when a send does not go out.
#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
    app_url: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(api_key: &str, from_email: &str, from_name: &str, app_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), String> {
        let request = ResendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let response = self.client
            .post("https://api.resend.com/emails")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("email send failed: {e}"))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("email API error: {body}"));
        }

        tracing::debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }

    pub async fn send_verification_link(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), String> {
        let url = format!("{}/verify-email?token={token}", self.app_url);
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2 style="color: #2563eb;">{app} - Verify your email</h2>
            <p>Hi {name},</p>
            <p>Thanks for signing up. Click the link below to verify your email address:</p>
            <p><a href="{url}" style="color: #2563eb;">{url}</a></p>
            <p style="color: #666; margin-top: 20px;">This link expires in 24 hours.</p>
            </div>"#,
            app = self.from_name,
        );

        let subject = format!("Verify your email for {}", self.from_name);
        self.send_email(to, &subject, &html).await
    }

    pub async fn send_password_reset_link(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), String> {
        let url = format!("{}/reset-password?token={token}", self.app_url);
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2 style="color: #2563eb;">{app} - Password reset</h2>
            <p>Hi {name},</p>
            <p>You requested to reset your password. Click the link below to continue:</p>
            <p><a href="{url}" style="color: #2563eb;">{url}</a></p>
            <p style="color: #666; margin-top: 20px;">This link expires in 1 hour. If you did not request this, please ignore this email.</p>
            </div>"#,
            app = self.from_name,
        );

        let subject = format!("Reset your password for {}", self.from_name);
        self.send_email(to, &subject, &html).await
    }
}
