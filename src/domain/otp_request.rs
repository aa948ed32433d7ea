//! src/domain/otp_request.rs
use serde_json::Value;

#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    #[error("Email and OTP are required.")]
    MissingFields,
    #[error("{0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Cannot read `email` and `otp` from a null request body")]
    NullBody,
}

/// Recipient address, taken as given. Only presence is checked.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientEmail(String);

impl AsRef<str> for RecipientEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipientEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

#[derive(Clone, PartialEq)]
pub struct Otp(String);

impl AsRef<str> for Otp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Otp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Otp([REDACTED])")
    }
}

#[derive(Debug)]
pub struct OtpEmailRequest {
    pub email: RecipientEmail,
    pub otp: Otp,
}

impl OtpEmailRequest {
    /// A field is present when it is a non-empty string or a non-zero number.
    pub fn parse(body: &[u8]) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_slice(body).map_err(RequestError::Malformed)?;
        if value.is_null() {
            return Err(RequestError::NullBody);
        }

        let email = present_text(value.get("email"));
        let otp = present_text(value.get("otp"));

        match (email, otp) {
            (Some(email), Some(otp)) => Ok(Self {
                email: RecipientEmail(email),
                otp: Otp(otp),
            }),
            _ => Err(RequestError::MissingFields),
        }
    }
}

/// Unlike a JS truthiness check, `true`, arrays and objects are not
/// accepted as present: only strings and numbers can be rendered.
fn present_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(number_text(n)),
        _ => None,
    }
}

// Whole floats print without a fraction, so `1e6` reads "1000000".
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}
