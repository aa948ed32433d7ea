//! src/email/mod.rs
mod otp;
pub use otp::{render_otp_html, OTP_SUBJECT};

mod resend;
pub use resend::{DeliveryError, Resend};
