//! src/routes/send_otp.rs
use crate::domain::{OtpEmailRequest, RequestError};
use crate::email::{DeliveryError, Resend};
use crate::routes::error_chain_fmt;
use crate::secret_store::{SecretStore, SecretStoreError, RESEND_API_KEY};
use actix_web::error::PayloadError;
use actix_web::http::header::ContentType;
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder, ResponseError};
use futures_util::StreamExt;
use serde::Serialize;
use uuid::Uuid;

const MAX_BODY_SIZE: usize = 1_048_576;

const CORS_HEADERS: [(&str, &str); 2] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "authorization, x-client-info, apikey, content-type",
    ),
];

#[derive(thiserror::Error)]
pub enum SendOtpError {
    #[error("Email and OTP are required.")]
    MissingFields,
    #[error("Could not retrieve Resend API key from database.")]
    SecretUnavailable(#[source] SecretStoreError),
    #[error(transparent)]
    MalformedBody(RequestError),
    #[error("Failed to read the request body")]
    UnreadableBody(#[source] PayloadError),
    #[error("Request body is larger than {0} bytes")]
    BodyTooLarge(usize),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl From<RequestError> for SendOtpError {
    fn from(e: RequestError) -> Self {
        match e {
            RequestError::MissingFields => SendOtpError::MissingFields,
            e => SendOtpError::MalformedBody(e),
        }
    }
}

impl std::fmt::Debug for SendOtpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct MessageBody {
    message: &'static str,
}

impl ResponseError for SendOtpError {
    fn status_code(&self) -> StatusCode {
        match self {
            SendOtpError::MissingFields => StatusCode::BAD_REQUEST,
            SendOtpError::SecretUnavailable(_)
            | SendOtpError::MalformedBody(_)
            | SendOtpError::UnreadableBody(_)
            | SendOtpError::BodyTooLarge(_)
            | SendOtpError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        with_cors(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

fn with_cors(status: StatusCode) -> HttpResponseBuilder {
    let mut builder = HttpResponse::build(status);
    for header in CORS_HEADERS {
        builder.insert_header(header);
    }
    builder
}

async fn read_body(mut payload: web::Payload) -> Result<web::BytesMut, SendOtpError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(SendOtpError::UnreadableBody)?;
        if body.len() + chunk.len() > MAX_BODY_SIZE {
            return Err(SendOtpError::BodyTooLarge(MAX_BODY_SIZE));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[tracing::instrument(
    name = "Sending a one-time password",
    skip(req, payload, secret_store, resend),
    fields(request_id = %Uuid::new_v4(), method = %req.method())
)]
pub async fn send_otp(
    req: HttpRequest,
    payload: web::Payload,
    secret_store: web::Data<dyn SecretStore>,
    resend: web::Data<Resend>,
) -> Result<HttpResponse, SendOtpError> {
    if *req.method() == Method::OPTIONS {
        return Ok(with_cors(StatusCode::OK)
            .content_type(ContentType::plaintext())
            .body("ok"));
    }

    let api_key = secret_store
        .lookup(RESEND_API_KEY)
        .await
        .map_err(SendOtpError::SecretUnavailable)?;

    // The key is fetched before the body is read.
    let body = read_body(payload).await?;
    let request = OtpEmailRequest::parse(&body)?;

    resend
        .send_otp(&api_key, &request.email, &request.otp)
        .await?;

    Ok(with_cors(StatusCode::OK).json(MessageBody {
        message: "OTP email sent successfully.",
    }))
}
