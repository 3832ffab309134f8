//! Security headers: a fixed set of response headers
//! plus a no-store `Cache-Control` on every path except the configured
//! whitelist.

use crate::app::config::SecurityHeadersConfig;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::Error;

pub async fn security_headers(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let config = req
        .app_data::<actix_web::web::Data<SecurityHeadersConfig>>()
        .expect("SecurityHeadersConfig not registered as app_data")
        .clone();

    if !config.enabled {
        return next.call(req).await;
    }

    let path = req.path().to_string();
    let mut res = next.call(req).await?;
    let headers = res.headers_mut();

    headers.insert(
        HeaderName::from_static("x-frame-options"),
        HeaderValue::from_static("DENY"),
    );
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        HeaderName::from_static("referrer-policy"),
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    if config.hsts {
        headers.insert(
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=63072000; includeSubDomains"),
        );
    }
    if let Some(csp) = &config.csp {
        if let Ok(value) = HeaderValue::from_str(csp) {
            headers.insert(HeaderName::from_static("content-security-policy"), value);
        }
    }
    if let Some(pp) = &config.permissions_policy {
        if let Ok(value) = HeaderValue::from_str(pp) {
            headers.insert(HeaderName::from_static("permissions-policy"), value);
        }
    }

    let cacheable = config.cacheable_paths.iter().any(|p| p == &path);
    if !cacheable {
        headers.insert(
            HeaderName::from_static("cache-control"),
            HeaderValue::from_static("no-store"),
        );
    }

    Ok(res)
}
