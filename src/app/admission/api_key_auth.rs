//! API-key auth: extracts a key from the configured
//! header or `Authorization: Bearer`, validates it against the cache, the
//! remote `nexus:api_keys` hash, then the local config map, in that order,
//! and injects `X-Publisher-ID` on success.

use crate::app::admission::api_key_cache::{ApiKeyCache, CacheLookup};
use crate::app::config::AuthConfig;
use crate::app::errors::AdmissionError;
use crate::core::kv::{API_KEYS_KEY, RedisKvStore};
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::Error;
use subtle::ConstantTimeEq;

pub const PUBLISHER_ID_HEADER: &str = "x-publisher-id";

fn extract_key(req: &ServiceRequest, header_name: &str) -> Option<String> {
    if !header_name.is_empty() {
        if let Some(value) = req
            .headers()
            .get(header_name)
            .and_then(|v| v.to_str().ok())
        {
            return Some(value.to_string());
        }
    }
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Constant-time equality against every configured key, so a match's
/// position never leaks via early-exit timing.
fn constant_time_lookup(candidate: &str, keys: impl Iterator<Item = (String, String)>) -> Option<String> {
    let mut found = None;
    for (key, publisher_id) in keys {
        if key.as_bytes().ct_eq(candidate.as_bytes()).into() {
            found = Some(publisher_id);
        }
    }
    found
}

pub async fn api_key_auth(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let config = req
        .app_data::<actix_web::web::Data<AuthConfig>>()
        .expect("AuthConfig not registered as app_data")
        .clone();

    if !config.enabled {
        return next.call(req).await;
    }

    let cache = req
        .app_data::<actix_web::web::Data<ApiKeyCache>>()
        .expect("ApiKeyCache not registered as app_data")
        .clone();

    let api_key = extract_key(&req, &config.header_name).ok_or(AdmissionError::Unauthenticated)?;

    let publisher_id = match cache.lookup(&api_key) {
        CacheLookup::Valid(publisher_id) => Some(publisher_id),
        CacheLookup::Invalid => None,
        CacheLookup::Unknown => {
            let from_remote = if config.use_redis {
                match req.app_data::<actix_web::web::Data<RedisKvStore>>() {
                    Some(kv) => kv.hget(API_KEYS_KEY, &api_key).await.ok().flatten(),
                    None => None,
                }
            } else {
                None
            };

            from_remote.or_else(|| {
                constant_time_lookup(
                    &api_key,
                    config
                        .api_keys
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone())),
                )
            })
        }
    };

    match publisher_id {
        Some(publisher_id) => {
            cache.record_valid(&api_key, &publisher_id);
            req.headers_mut().insert(
                HeaderName::from_static(PUBLISHER_ID_HEADER),
                HeaderValue::from_str(&publisher_id).map_err(|_| AdmissionError::Unauthenticated)?,
            );
            next.call(req).await
        }
        None => {
            cache.record_invalid(&api_key);
            Err(AdmissionError::Unauthenticated.into())
        }
    }
}
