//! CORS: origin echo against an allow-list of exact
//! origins, `*`, or `*.suffix`, `Vary: Origin` always set, `OPTIONS`
//! short-circuited to 204.

use crate::app::config::CorsConfig;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{Error, HttpResponse};

fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|pattern| {
        if pattern == "*" {
            true
        } else if let Some(suffix) = pattern.strip_prefix("*.") {
            origin
                .rsplit_once("://")
                .map(|(_, host)| host == suffix || host.ends_with(&format!(".{suffix}")))
                .unwrap_or(false)
        } else {
            pattern == origin
        }
    })
}

pub async fn cors<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let config = req
        .app_data::<actix_web::web::Data<CorsConfig>>()
        .expect("CorsConfig not registered as app_data")
        .clone();

    if !config.enabled {
        return next.call(req).await.map(|res| res.map_into_left_body());
    }

    let origin = req
        .headers()
        .get(actix_web::http::header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    if req.method() == Method::OPTIONS {
        let mut builder = HttpResponse::NoContent();
        builder.insert_header((actix_web::http::header::VARY, "Origin"));
        if let Some(origin) = &origin {
            if origin_allowed(origin, &config.allowed_origins) {
                builder.insert_header((actix_web::http::header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.as_str()));
                builder.insert_header((
                    actix_web::http::header::ACCESS_CONTROL_MAX_AGE,
                    config.max_age_secs.to_string(),
                ));
                if config.allow_credentials {
                    builder.insert_header((
                        actix_web::http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                        "true",
                    ));
                }
            }
        }
        return Ok(req.into_response(builder.finish()).map_into_right_body());
    }

    let mut res = next.call(req).await?;
    let headers = res.headers_mut();
    headers.insert(HeaderName::from_static("vary"), HeaderValue::from_static("Origin"));
    if let Some(origin) = &origin {
        if origin_allowed(origin, &config.allowed_origins) {
            if let Ok(value) = HeaderValue::from_str(origin) {
                headers.insert(
                    HeaderName::from_static("access-control-allow-origin"),
                    value,
                );
            }
            if config.allow_credentials {
                headers.insert(
                    HeaderName::from_static("access-control-allow-credentials"),
                    HeaderValue::from_static("true"),
                );
            }
        }
    }

    Ok(res.map_into_left_body())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_suffix_matches_subdomains() {
        let allowed = vec!["*.example.com".to_string()];
        assert!(origin_allowed("https://ads.example.com", &allowed));
        assert!(!origin_allowed("https://evil.com", &allowed));
    }

    #[test]
    fn exact_match_required_without_wildcard() {
        let allowed = vec!["https://pub.example.com".to_string()];
        assert!(origin_allowed("https://pub.example.com", &allowed));
        assert!(!origin_allowed("https://other.example.com", &allowed));
    }
}
