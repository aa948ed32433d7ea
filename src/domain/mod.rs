//! src/domain/mod.rs
mod otp_request;
pub use otp_request::{Otp, OtpEmailRequest, RecipientEmail, RequestError};
