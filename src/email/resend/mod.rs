//! src/email/resend/mod.rs
use crate::configuration::EmailSettings;
use crate::domain::{Otp, RecipientEmail};
use lettre::address::AddressError;
use lettre::Address;
use reqwest::Client;
use secrecy::Secret;

mod email;
pub use email::DeliveryError;
use email::{EmailBuilder, EmailClient};

use super::{render_otp_html, OTP_SUBJECT};

#[derive(Debug)]
pub struct Resend {
    sender: String,
    escape_html: bool,
    email_client: EmailClient,
}

impl TryFrom<EmailSettings> for Resend {
    type Error = AddressError;

    fn try_from(settings: EmailSettings) -> Result<Self, Self::Error> {
        let address: Address = settings.sender_email.parse()?;
        let sender = if settings.sender_name.trim().is_empty() {
            address.to_string()
        } else {
            format!("{} <{}>", settings.sender_name.trim(), address)
        };

        Ok(Self {
            sender,
            escape_html: settings.escape_html,
            email_client: EmailClient {
                http_client: Client::new(),
                url: settings.api_url,
            },
        })
    }
}

impl Resend {
    pub fn sender(&self) -> &str {
        &self.sender
    }

    fn email_builder(&self) -> EmailBuilder<'_> {
        EmailBuilder::new(&self.sender)
    }

    #[tracing::instrument(
        name = "Sending an OTP email",
        skip(self, api_key, recipient, otp),
        fields(recipient = %recipient)
    )]
    pub async fn send_otp(
        &self,
        api_key: &Secret<String>,
        recipient: &RecipientEmail,
        otp: &Otp,
    ) -> Result<(), DeliveryError> {
        let html = render_otp_html(otp.as_ref(), self.escape_html);
        let email = self
            .email_builder()
            .to(recipient.as_ref())
            .subject(OTP_SUBJECT)
            .html(&html)
            .build();

        self.email_client.send_email(api_key, &email).await
    }
}
