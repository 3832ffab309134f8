//! Startup context: every collaborator the boot pipeline builds, stashed in
//! a `OnceLock` so later stages (and the eventual `AppState`) can pull them
//! out in whatever order they were filled, plus a couple of `Mutex<Option<_>>`
//! slots for values a later stage takes ownership of.

use crate::app::admission::api_key_cache::ApiKeyCache;
use crate::app::admission::publisher_auth::PublisherRateLimiters;
use crate::app::admission::ClientRateLimiters;
use crate::app::config::NexusConfig;
use crate::app::config_manager::ConfigManager;
use crate::app::idr::IdrClient;
use crate::app::managers::{PublisherManager, SyncerManager};
use crate::core::auction::AuctionOrchestrator;
use crate::core::kv::RedisKvStore;
use crate::core::registry::{BidderRegistry, ProviderStopHandle};
use actix_web::dev::ServerHandle;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Default)]
pub struct StartupContext {
    /// Path to the config file this process was started with.
    pub config_path: Mutex<Option<PathBuf>>,
    pub config_manager: OnceLock<Arc<ConfigManager>>,
    /// Set only when an OTLP sink is configured, so shutdown can flush it.
    pub observability: OnceLock<SdkTracerProvider>,

    pub kv: OnceLock<RedisKvStore>,
    pub registry: OnceLock<Arc<BidderRegistry>>,
    /// Stops the dynamic registry's background Redis refresh loop.
    pub registry_refresh_stop: OnceLock<ProviderStopHandle>,
    pub orchestrator: OnceLock<Arc<AuctionOrchestrator>>,
    pub publisher_manager: OnceLock<Arc<PublisherManager>>,
    pub syncer_manager: OnceLock<Arc<SyncerManager>>,
    pub api_key_cache: OnceLock<Arc<ApiKeyCache>>,
    pub publisher_rate_limiters: OnceLock<Arc<PublisherRateLimiters>>,
    pub client_rate_limiters: OnceLock<Arc<ClientRateLimiters>>,
    pub idr: OnceLock<Option<Arc<IdrClient>>>,

    /// The bound HTTP server's stop handle, set once it starts listening.
    pub server_handle: OnceLock<ServerHandle>,
}

impl StartupContext {
    pub fn config(&self) -> NexusConfig {
        self.config_manager
            .get()
            .expect("config manager not loaded yet")
            .get()
            .clone()
    }
}
