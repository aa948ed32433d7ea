//! src/email/otp.rs

pub const OTP_SUBJECT: &str = "Your Account Invitation and OTP";

pub fn render_otp_html(otp: &str, escape_html: bool) -> String {
    let otp = if escape_html {
        htmlescape::encode_minimal(otp)
    } else {
        otp.to_string()
    };

    format!(
        r#"
        <div style="font-family: sans-serif; padding: 20px; color: #333;">
          <h2>Welcome!</h2>
          <p>An account has been created for you on the Student Transport Monitoring platform.</p>
          <p>Please use the following One-Time Password (OTP) for your first login:</p>
          <h1 style="font-size: 48px; letter-spacing: 5px; margin: 20px 0;">{}</h1>
          <p>You will be prompted to set a permanent password after logging in.</p>
          <hr/>
          <p style="font-size: 12px; color: #777;">If you did not request this, please ignore this email.</p>
        </div>
      "#,
        otp
    )
}
