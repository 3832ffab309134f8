use crate::app::lifecycle::context::StartupContext;
use crate::core::adapter::adapters::{appnexus, rubicon};
use crate::core::registry::{BidderRegistry, RedisBidderProvider};
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use crate::pipeline::AsyncTask;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub(crate) struct RegistryLoadTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for RegistryLoadTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config();
        let kv = ctx
            .kv
            .get()
            .ok_or_else(|| anyhow!("redis store not connected before registry load"))?
            .clone();

        let registry = Arc::new(BidderRegistry::new());
        registry
            .register(appnexus::default_config())
            .map_err(|e| anyhow!(e.to_string()))?;
        registry
            .register(rubicon::default_config())
            .map_err(|e| anyhow!(e.to_string()))?;

        let poll_interval = Duration::from_secs(config.redis.bidder_refresh_secs.max(1));
        let provider = RedisBidderProvider::new(kv, poll_interval);
        let stop_handle = registry.start_dynamic(provider).await?;

        info!(bidders = ?registry.list_bidders(), "bidder registry loaded");

        ctx.registry
            .set(registry)
            .map_err(|_| anyhow!("bidder registry already initialized"))?;
        ctx.registry_refresh_stop
            .set(stop_handle)
            .map_err(|_| anyhow!("registry refresh stop handle already initialized"))?;

        Ok(())
    }
}
