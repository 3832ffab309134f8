//! Publisher auth: only applies to
//! `POST /openrtb2/auction`. Parses a minimal `{site, app}` projection of
//! the body (not a full OpenRTB deserialize), validates the publisher
//! against [`PublisherManager`] (which already merges the local config
//! seed with the remote `nexus:publishers` hash — see
//! `app::managers::PublisherManager::spawn_refresh`), enforces domain
//! membership, and applies a per-publisher token bucket.

use crate::app::admission::api_key_auth::PUBLISHER_ID_HEADER;
use crate::app::config::PublisherAuthConfig;
use crate::app::errors::AdmissionError;
use crate::app::managers::PublisherManager;
use actix_web::body::MessageBody;
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::web::Bytes;
use actix_web::Error;
use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
struct SitePublisherProjection {
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SiteProjection {
    domain: Option<String>,
    publisher: Option<SitePublisherProjection>,
}

#[derive(Debug, Default, Deserialize)]
struct AppProjection {
    bundle: Option<String>,
    publisher: Option<SitePublisherProjection>,
}

#[derive(Debug, Default, Deserialize)]
struct BidRequestProjection {
    site: Option<SiteProjection>,
    app: Option<AppProjection>,
}

impl BidRequestProjection {
    fn publisher_id(&self) -> Option<String> {
        self.site
            .as_ref()
            .and_then(|s| s.publisher.as_ref())
            .and_then(|p| p.id.clone())
            .or_else(|| {
                self.app
                    .as_ref()
                    .and_then(|a| a.publisher.as_ref())
                    .and_then(|p| p.id.clone())
            })
    }

    fn domain(&self) -> Option<String> {
        self.site
            .as_ref()
            .and_then(|s| s.domain.clone())
            .or_else(|| self.app.as_ref().and_then(|a| a.bundle.clone()))
    }
}

/// Per-publisher token buckets, created lazily on first sight of a
/// publisher and keyed by publisher ID.
#[derive(Default)]
pub struct PublisherRateLimiters {
    limiters: DashMap<String, Arc<DefaultDirectRateLimiter>>,
}

impl PublisherRateLimiters {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self, publisher_id: &str, qps: u32, burst: u32) -> bool {
        if qps == 0 {
            return true;
        }
        let limiter = self
            .limiters
            .entry(publisher_id.to_string())
            .or_insert_with(|| {
                let quota = Quota::per_second(NonZeroU32::new(qps.max(1)).unwrap())
                    .allow_burst(NonZeroU32::new(burst.max(1)).unwrap());
                Arc::new(RateLimiter::direct(quota))
            })
            .clone();
        limiter.check().is_ok()
    }
}

fn payload_from_bytes(bytes: Bytes) -> Payload {
    Payload::from(bytes)
}

pub async fn publisher_auth(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let config = req
        .app_data::<actix_web::web::Data<PublisherAuthConfig>>()
        .expect("PublisherAuthConfig not registered as app_data")
        .clone();

    let is_auction_post = req.method() == Method::POST && req.path() == "/openrtb2/auction";

    if !config.enabled || !is_auction_post {
        return next.call(req).await;
    }

    let bytes = req.extract::<Bytes>().await.unwrap_or_else(|_| Bytes::new());
    req.set_payload(payload_from_bytes(bytes.clone()));

    let projection: BidRequestProjection = serde_json::from_slice(&bytes).unwrap_or_default();
    let publisher_id = projection.publisher_id();
    let domain = projection.domain();

    let publisher_id = match publisher_id {
        Some(id) => id,
        None if config.allow_unregistered => return next.call(req).await,
        None => return Err(AdmissionError::UnknownPublisher.into()),
    };

    let manager = req
        .app_data::<actix_web::web::Data<PublisherManager>>()
        .expect("PublisherManager not registered as app_data")
        .clone();

    let publisher = match manager.get(&publisher_id) {
        Some(publisher) => publisher,
        None if config.allow_unregistered => {
            inject_publisher_id(&mut req, &publisher_id)?;
            return next.call(req).await;
        }
        None => return Err(AdmissionError::UnknownPublisher.into()),
    };

    if config.validate_domain {
        let allowed = domain
            .as_deref()
            .map(|d| publisher.allows_domain(d))
            .unwrap_or(false);
        if !allowed {
            return Err(AdmissionError::ForbiddenDomain.into());
        }
    }

    let limiters = req
        .app_data::<actix_web::web::Data<PublisherRateLimiters>>()
        .expect("PublisherRateLimiters not registered as app_data")
        .clone();
    if !limiters.check(&publisher.id, publisher.rate_limit_qps, publisher.rate_limit_burst) {
        return Err(AdmissionError::RateLimited { retry_after_secs: 1 }.into());
    }

    inject_publisher_id(&mut req, &publisher_id)?;
    next.call(req).await
}

fn inject_publisher_id(req: &mut ServiceRequest, publisher_id: &str) -> Result<(), Error> {
    let value = actix_web::http::header::HeaderValue::from_str(publisher_id)
        .map_err(|_| AdmissionError::UnknownPublisher)?;
    req.headers_mut().insert(
        actix_web::http::header::HeaderName::from_static(PUBLISHER_ID_HEADER),
        value,
    );
    Ok(())
}
