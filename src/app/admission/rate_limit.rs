//! Global rate limiter: a per-client-key `governor` token bucket, created
//! lazily on first sight of a client and garbage-collected by a background
//! sweep of idle entries.

use crate::app::config::RateLimitConfig;
use crate::app::errors::AdmissionError;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::Error;
use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Entry {
    limiter: DefaultDirectRateLimiter,
    last_seen_unix: AtomicI64,
}

pub struct ClientRateLimiters {
    entries: DashMap<String, Arc<Entry>>,
    rps: u32,
    burst: u32,
}

impl ClientRateLimiters {
    pub fn new(rps: u32, burst: u32) -> Arc<Self> {
        Arc::new(Self {
            entries: DashMap::new(),
            rps: rps.max(1),
            burst: burst.max(1),
        })
    }

    fn check(&self, key: &str) -> bool {
        let now = now_unix();
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| {
                let quota = Quota::per_second(NonZeroU32::new(self.rps).unwrap())
                    .allow_burst(NonZeroU32::new(self.burst).unwrap());
                Arc::new(Entry {
                    limiter: RateLimiter::direct(quota),
                    last_seen_unix: AtomicI64::new(now),
                })
            })
            .clone();
        entry.last_seen_unix.store(now, Ordering::Relaxed);
        entry.limiter.check().is_ok()
    }

    /// Drops entries idle for longer than `idle_after`, run on `interval`
    /// by a background task.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration, idle_after: Duration) {
        let limiters = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let now = now_unix();
                let cutoff = now - idle_after.as_secs() as i64;
                limiters
                    .entries
                    .retain(|_, entry| entry.last_seen_unix.load(Ordering::Relaxed) >= cutoff);
            }
        });
    }
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Client key precedence: `X-Publisher-ID`, else
/// first `X-Forwarded-For` hop, else `X-Real-IP`, else the peer address
/// without its port.
fn client_key(req: &ServiceRequest) -> String {
    if let Some(id) = req
        .headers()
        .get(crate::app::admission::api_key_auth::PUBLISHER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return id.to_string();
    }
    if let Some(xff) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = xff.split(',').next() {
            return first.trim().to_string();
        }
    }
    if let Some(real_ip) = req.headers().get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.to_string();
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let config = req
        .app_data::<actix_web::web::Data<RateLimitConfig>>()
        .expect("RateLimitConfig not registered as app_data")
        .clone();

    if !config.enabled {
        return next.call(req).await;
    }

    let limiters = req
        .app_data::<actix_web::web::Data<Arc<ClientRateLimiters>>>()
        .expect("ClientRateLimiters not registered as app_data")
        .clone();

    let key = client_key(&req);
    if !limiters.check(&key) {
        return Err(AdmissionError::RateLimited { retry_after_secs: 1 }.into());
    }

    next.call(req).await
}
