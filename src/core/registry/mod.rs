//! The bidder registry: a lock-free-read, swap-on-write
//! snapshot of every known bidder's config and instantiated adapter,
//! seeded statically at boot and kept current by a [`Provider`].

pub mod provider;
pub mod redis_provider;

pub use provider::{Provider, ProviderEvent, ProviderStopHandle};
pub use redis_provider::RedisBidderProvider;

use crate::core::adapter::generic::GenericConfigurableAdapter;
use crate::core::adapter::Adapter;
use crate::core::models::bidder_config::BidderConfig;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

/// A config paired with the adapter built from it — rebuilt together on
/// every update so the two can never drift out of sync.
pub struct RegisteredBidder {
    pub config: BidderConfig,
    pub adapter: Arc<dyn Adapter>,
}

fn build_entry(config: BidderConfig) -> Arc<RegisteredBidder> {
    let adapter: Arc<dyn Adapter> = Arc::new(GenericConfigurableAdapter::new(config.clone()));
    Arc::new(RegisteredBidder { config, adapter })
}

#[derive(Debug)]
pub struct DuplicateBidderError(pub String);

impl std::fmt::Display for DuplicateBidderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bidder '{}' is already registered", self.0)
    }
}
impl std::error::Error for DuplicateBidderError {}

/// The registry itself. Reads never block on writes: every update builds a
/// brand-new map and swaps the pointer atomically.
pub struct BidderRegistry {
    bidders: ArcSwap<HashMap<String, Arc<RegisteredBidder>>>,
}

impl Default for BidderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BidderRegistry {
    pub fn new() -> Self {
        Self {
            bidders: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Static, boot-time registration — fails loudly on a duplicate code
    /// rather than silently overwriting.
    pub fn register(&self, config: BidderConfig) -> Result<(), DuplicateBidderError> {
        let current = self.bidders.load();
        if current.contains_key(&config.bidder_code) {
            return Err(DuplicateBidderError(config.bidder_code));
        }
        let mut next = (**current).clone();
        next.insert(config.bidder_code.clone(), build_entry(config));
        self.bidders.store(Arc::new(next));
        Ok(())
    }

    /// Dynamic updates (add/modify/remove) from a [`ProviderEvent`] stream
    /// overwrite unconditionally — the remote source of truth wins.
    pub fn apply_event(&self, event: ProviderEvent<BidderConfig>) {
        let current = self.bidders.load();
        let mut next = (**current).clone();
        match event {
            ProviderEvent::Added(config) | ProviderEvent::Modified(config) => {
                next.insert(config.bidder_code.clone(), build_entry(config));
            }
            ProviderEvent::Removed(bidder_code) => {
                next.remove(&bidder_code);
            }
        }
        self.bidders.store(Arc::new(next));
    }

    pub fn get(&self, bidder_code: &str) -> Option<Arc<RegisteredBidder>> {
        self.bidders.load().get(bidder_code).cloned()
    }

    /// Defensive copy: callers get their own `Vec`, never a live view into
    /// registry internals.
    pub fn get_all(&self) -> Vec<Arc<RegisteredBidder>> {
        self.bidders.load().values().cloned().collect()
    }

    pub fn list_bidders(&self) -> Vec<String> {
        self.bidders.load().keys().cloned().collect()
    }

    pub fn list_enabled_bidders(&self) -> Vec<String> {
        self.bidders
            .load()
            .values()
            .filter(|b| b.config.is_enabled())
            .map(|b| b.config.bidder_code.clone())
            .collect()
    }

    /// Seeds the registry from the provider's initial snapshot, then hands
    /// it a callback that folds every subsequent event into `self`. `self`
    /// must be wrapped in an `Arc` since the callback outlives this call.
    /// Returns a handle the caller must keep and stop during shutdown, or
    /// the refresh loop runs for the rest of the process's life.
    pub async fn start_dynamic(
        self: &Arc<Self>,
        provider: impl Provider<BidderConfig> + 'static,
    ) -> anyhow::Result<provider::ProviderStopHandle> {
        let registry = Arc::clone(self);
        let (initial, stop_handle) = provider
            .start(Box::new(move |event| registry.apply_event(event)))
            .await?;
        for config in initial {
            self.apply_event(ProviderEvent::Added(config));
        }
        Ok(stop_handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(code: &str) -> BidderConfig {
        BidderConfig {
            bidder_code: code.into(),
            ..Default::default()
        }
    }

    #[test]
    fn register_rejects_duplicates() {
        let registry = BidderRegistry::new();
        registry.register(config("acme")).unwrap();
        assert!(registry.register(config("acme")).is_err());
    }

    #[test]
    fn apply_event_removed_drops_entry() {
        let registry = BidderRegistry::new();
        registry.apply_event(ProviderEvent::Added(config("acme")));
        assert!(registry.get("acme").is_some());
        registry.apply_event(ProviderEvent::Removed("acme".into()));
        assert!(registry.get("acme").is_none());
    }

    #[test]
    fn get_all_is_a_defensive_copy() {
        let registry = BidderRegistry::new();
        registry.register(config("acme")).unwrap();
        let snapshot = registry.get_all();
        registry.apply_event(ProviderEvent::Removed("acme".into()));
        assert_eq!(snapshot.len(), 1);
        assert!(registry.get_all().is_empty());
    }

    #[test]
    fn list_enabled_bidders_excludes_disabled() {
        use crate::core::models::bidder_config::BidderStatus;
        let registry = BidderRegistry::new();
        let mut active = config("acme");
        active.status = BidderStatus::Active;
        let mut disabled = config("legacy");
        disabled.status = BidderStatus::Disabled;
        registry.register(active).unwrap();
        registry.register(disabled).unwrap();
        assert_eq!(registry.list_enabled_bidders(), vec!["acme".to_string()]);
    }
}
