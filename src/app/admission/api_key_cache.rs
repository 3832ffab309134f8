//! Positive/negative API-key validation cache: two `moka::sync::Cache`
//! instances with different TTLs so a known-bad key doesn't get
//! re-validated on every request but also doesn't stay rejected for as
//! long as a known-good one does.

use moka::sync::Cache;
use std::time::Duration;

pub struct ApiKeyCache {
    positive: Cache<String, String>,
    negative: Cache<String, ()>,
}

impl ApiKeyCache {
    pub fn new() -> Self {
        Self {
            positive: Cache::builder()
                .time_to_live(Duration::from_secs(60))
                .max_capacity(100_000)
                .build(),
            negative: Cache::builder()
                .time_to_live(Duration::from_secs(10))
                .max_capacity(100_000)
                .build(),
        }
    }

    /// `Some(publisher_id)` if cached as valid, `None` if not cached either
    /// way (caller must check the backing stores) — a cached-negative
    /// lookup short-circuits to `Rejected`.
    pub fn lookup(&self, api_key: &str) -> CacheLookup {
        if let Some(publisher_id) = self.positive.get(api_key) {
            return CacheLookup::Valid(publisher_id);
        }
        if self.negative.contains_key(api_key) {
            return CacheLookup::Invalid;
        }
        CacheLookup::Unknown
    }

    pub fn record_valid(&self, api_key: &str, publisher_id: &str) {
        self.positive.insert(api_key.to_string(), publisher_id.to_string());
    }

    pub fn record_invalid(&self, api_key: &str) {
        self.negative.insert(api_key.to_string(), ());
    }
}

impl Default for ApiKeyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Valid(String),
    Invalid,
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_unknown_until_recorded() {
        let cache = ApiKeyCache::new();
        assert_eq!(cache.lookup("k1"), CacheLookup::Unknown);
        cache.record_valid("k1", "pub1");
        assert_eq!(cache.lookup("k1"), CacheLookup::Valid("pub1".into()));
    }

    #[test]
    fn negative_cache_short_circuits() {
        let cache = ApiKeyCache::new();
        cache.record_invalid("bad");
        assert_eq!(cache.lookup("bad"), CacheLookup::Invalid);
    }
}
