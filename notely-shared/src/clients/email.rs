use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email delivery is not configured")]
    NotConfigured,

    #[error("email send failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Transactional email through the Resend HTTP API.
///
/// Without an API key every send fails with [`EmailError::NotConfigured`];
/// callers decide how to degrade.
#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_key: Option<String>,
    from_email: String,
    from_name: String,
    app_url: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl EmailClient {
    pub fn new(
        api_key: Option<String>,
        from_email: impl Into<String>,
        from_name: impl Into<String>,
        app_url: impl Into<String>,
    ) -> Result<Self, EmailError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            from_email: from_email.into(),
            from_name: from_name.into(),
            app_url: app_url.into(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str, text: &str) -> Result<(), EmailError> {
        let api_key = self.api_key.as_deref().ok_or(EmailError::NotConfigured)?;

        let request = ResendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: [to],
            subject,
            html,
            text,
        };

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected { status, body });
        }

        tracing::debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }

    pub async fn send_otp_code(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), EmailError> {
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2 style="color: #3b82f6;">{name} - Verification Code</h2>
            <p>Use the code below to sign in:</p>
            <div style="background: #f8fafc; color: #1f2937; font-size: 32px; font-weight: bold; text-align: center; padding: 20px; border-radius: 8px; letter-spacing: 8px;">{code}</div>
            <p style="color: #666; margin-top: 20px;">This code expires in {ttl_minutes} minutes. If you did not request it, ignore this email.</p>
            </div>"#,
            name = self.from_name,
        );
        let text = format!(
            "Your {} verification code is {code}. It expires in {ttl_minutes} minutes.",
            self.from_name
        );

        let subject = format!("Your {} verification code", self.from_name);
        self.send_email(to, &subject, &html, &text).await
    }

    pub async fn send_welcome(&self, to: &str, user_name: &str) -> Result<(), EmailError> {
        let dashboard = format!("{}/dashboard", self.app_url.trim_end_matches('/'));
        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
            <h2 style="color: #3b82f6;">Welcome to {name}, {user_name}!</h2>
            <p>Your notes are private to you. Use colors, tags and search to keep them organized.</p>
            <p><a href="{dashboard}" style="display: inline-block; background: #3b82f6; color: white; padding: 12px 24px; text-decoration: none; border-radius: 8px;">Start taking notes</a></p>
            </div>"#,
            name = self.from_name,
        );
        let text = format!(
            "Welcome to {}, {user_name}! Get started at {dashboard}",
            self.from_name
        );

        let subject = format!("Welcome to {}!", self.from_name);
        self.send_email(to, &subject, &html, &text).await
    }
}
