//! Error taxonomy for the admission chain and auction handler.
//! Each variant carries its own HTTP status and renders a uniform
//! `{error, ...}` JSON envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AdmissionError {
    #[error("request body too large")]
    BodyTooLarge,
    #[error("request URL too long")]
    UrlTooLong,
    #[error("missing or invalid API key")]
    Unauthenticated,
    #[error("unknown publisher")]
    UnknownPublisher,
    #[error("publisher not permitted for this domain")]
    ForbiddenDomain,
    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },
}

impl ResponseError for AdmissionError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdmissionError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AdmissionError::UrlTooLong => StatusCode::from_u16(414).unwrap(),
            AdmissionError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AdmissionError::UnknownPublisher | AdmissionError::ForbiddenDomain => {
                StatusCode::FORBIDDEN
            }
            AdmissionError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let AdmissionError::RateLimited { retry_after_secs } = self {
            builder.insert_header(("Retry-After", retry_after_secs.to_string()));
        }
        builder.json(json!({ "error": self.to_string() }))
    }
}

/// Privacy-gate rejection body.
#[derive(Debug, Serialize)]
pub struct PrivacyRejection {
    pub error: &'static str,
    pub reason: String,
    pub regulation: &'static str,
    pub nbr: i32,
}

impl PrivacyRejection {
    pub fn new(regulation: &'static str, reason: impl Into<String>) -> Self {
        Self {
            error: "privacy violation",
            reason: reason.into(),
            regulation,
            nbr: crate::core::spec::nobidreasons::ADS_TXT_OR_PRIVACY,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::BadRequest().json(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuctionError {
    #[error("invalid bid request: {0}")]
    Validation(String),
    #[error("auction failed")]
    Internal,
}

impl ResponseError for AuctionError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuctionError::Validation(_) => StatusCode::BAD_REQUEST,
            AuctionError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
