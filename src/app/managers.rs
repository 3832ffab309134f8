//! `PublisherManager` and `SyncerManager` — ArcSwap-snapshot tables seeded
//! from local config and, for publishers, kept current by a background
//! poll of the remote `nexus:publishers` hash.

use crate::core::kv::{PUBLISHERS_KEY, RedisKvStore};
use crate::core::models::publisher::Publisher;
use crate::core::models::syncer::SyncerConfig;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct PublisherManager {
    pubs: ArcSwap<HashMap<String, Arc<Publisher>>>,
}

impl PublisherManager {
    pub fn new(seed: &[Publisher]) -> Self {
        let mut map = HashMap::new();
        for publisher in seed {
            map.insert(publisher.id.clone(), Arc::new(publisher.clone()));
        }
        Self {
            pubs: ArcSwap::from_pointee(map),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Publisher>> {
        self.pubs.load().get(id).cloned()
    }

    fn merge_remote(&self, remote: HashMap<String, String>) {
        let current = self.pubs.load();
        let mut next = (**current).clone();
        for (id, domain_list) in remote {
            let (rate_limit_qps, rate_limit_burst) = next
                .get(&id)
                .map(|existing| (existing.rate_limit_qps, existing.rate_limit_burst))
                .unwrap_or_default();
            next.insert(
                id.clone(),
                Arc::new(Publisher {
                    id,
                    domains: Publisher::parse_domain_list(&domain_list),
                    rate_limit_qps,
                    rate_limit_burst,
                }),
            );
        }
        self.pubs.store(Arc::new(next));
    }

    /// Polls `nexus:publishers` on `interval` and merges entries into the
    /// local snapshot. The remote hash is additive to the local config map,
    /// never authoritative for removal, since local config can still
    /// register publishers the remote store doesn't know about.
    pub fn spawn_refresh(self: &Arc<Self>, kv: RedisKvStore, interval: Duration) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match kv.hgetall(PUBLISHERS_KEY).await {
                    Ok(remote) => manager.merge_remote(remote),
                    Err(e) => {
                        tracing::warn!(error = %e, "publisher registry poll failed, retrying next tick")
                    }
                }
            }
        });
    }
}

pub struct SyncerManager {
    syncers: ArcSwap<HashMap<String, SyncerConfig>>,
}

impl SyncerManager {
    pub fn new(seed: HashMap<String, SyncerConfig>) -> Self {
        Self {
            syncers: ArcSwap::from_pointee(seed),
        }
    }

    pub fn get(&self, key: &str) -> Option<SyncerConfig> {
        self.syncers.load().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.syncers.load().keys().cloned().collect()
    }

    pub fn snapshot(&self) -> HashMap<String, SyncerConfig> {
        (**self.syncers.load()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_manager_seeds_from_config() {
        let manager = PublisherManager::new(&[Publisher {
            id: "pub1".into(),
            domains: vec!["example.com".into()],
            rate_limit_qps: 10,
            rate_limit_burst: 20,
        }]);
        assert!(manager.get("pub1").is_some());
        assert!(manager.get("missing").is_none());
    }

    #[test]
    fn syncer_manager_returns_configured_keys() {
        use std::collections::HashSet;
        let mut seed = HashMap::new();
        seed.insert(
            "adnxs".to_string(),
            SyncerConfig {
                key: "adnxs".into(),
                supports: HashSet::from([crate::core::models::syncer::SyncType::Redirect]),
                default: crate::core::models::syncer::SyncType::Redirect,
                iframe_url: None,
                redirect_url: Some("https://sync.example".into()),
                support_cors: true,
                user_macro: "{{redirect_url}}".into(),
            },
        );
        let manager = SyncerManager::new(seed);
        assert_eq!(manager.keys(), vec!["adnxs".to_string()]);
    }
}
