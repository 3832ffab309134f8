//! The handful of process-wide, `Arc`-shared collaborators every handler
//! needs. Registered individually as `web::Data<T>` (rather than one big
//! struct) so admission middlewares can depend on just the pieces they
//! need.

use crate::app::admission::api_key_cache::ApiKeyCache;
use crate::app::admission::publisher_auth::PublisherRateLimiters;
use crate::app::admission::ClientRateLimiters;
use crate::app::config_manager::ConfigManager;
use crate::app::idr::IdrClient;
use crate::app::managers::{PublisherManager, SyncerManager};
use crate::core::auction::AuctionOrchestrator;
use crate::core::kv::RedisKvStore;
use crate::core::registry::BidderRegistry;
use std::sync::Arc;

pub struct AppState {
    pub config_manager: Arc<ConfigManager>,
    pub registry: Arc<BidderRegistry>,
    pub orchestrator: Arc<AuctionOrchestrator>,
    pub kv: RedisKvStore,
    pub publisher_manager: Arc<PublisherManager>,
    pub syncer_manager: Arc<SyncerManager>,
    pub api_key_cache: Arc<ApiKeyCache>,
    pub publisher_rate_limiters: Arc<PublisherRateLimiters>,
    pub client_rate_limiters: Arc<ClientRateLimiters>,
    pub idr: Option<Arc<IdrClient>>,
}
