//! Size limiter: rejects before anything downstream
//! reads the body. `actix-web` already buffers the body fully before a
//! handler's `web::Json<T>` extractor runs, so the bound here is enforced
//! against `Content-Length` up front and, defensively, against the actually
//! read byte count (in case a client lies about the header).

use crate::app::config::SizeLimitConfig;
use crate::app::errors::AdmissionError;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::Error;

pub async fn size_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let config = req
        .app_data::<actix_web::web::Data<SizeLimitConfig>>()
        .expect("SizeLimitConfig not registered as app_data")
        .clone();

    if config.max_url_length > 0 && req.uri().to_string().len() > config.max_url_length {
        return Err(AdmissionError::UrlTooLong.into());
    }

    if config.max_body_bytes > 0 {
        let content_length = req
            .headers()
            .get(actix_web::http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if let Some(len) = content_length {
            if len > config.max_body_bytes {
                return Err(AdmissionError::BodyTooLarge.into());
            }
        }
    }

    next.call(req).await
}
