//! src/email/resend/email.rs
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("Failed to send email via Resend: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error("Failed to reach Resend")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
pub struct Email<'a> {
    from: &'a str,
    pub to: Vec<&'a str>,
    pub subject: &'a str,
    pub html: &'a str,
}

pub struct EmailBuilder<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

impl<'a> EmailBuilder<'a> {
    pub fn new(from: &'a str) -> Self {
        Self {
            from,
            to: vec![],
            subject: "",
            html: "",
        }
    }

    pub fn to(mut self, address: &'a str) -> Self {
        self.to.push(address);
        self
    }

    pub fn subject(mut self, subject: &'a str) -> Self {
        self.subject = subject;
        self
    }

    pub fn html(mut self, html: &'a str) -> Self {
        self.html = html;
        self
    }

    pub fn build(self) -> Email<'a> {
        Email {
            from: self.from,
            to: self.to,
            subject: self.subject,
            html: self.html,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug)]
pub struct EmailClient {
    pub http_client: Client,
    pub url: String,
}

impl EmailClient {
    pub async fn send_email<T>(
        &self,
        api_key: &Secret<String>,
        email: &T,
    ) -> Result<(), DeliveryError>
    where
        T: Serialize,
    {
        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await?;
        tracing::error!(%status, error_body = %body, "Resend API error");

        Err(DeliveryError::Rejected {
            status,
            message: rejection_message(status, &body),
        })
    }
}

/// Resend puts the reason in `message`. Fall back to the raw body, then
/// to the status line, when the body has some other shape.
fn rejection_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error_body) => error_body.message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status.to_string(),
    }
}
