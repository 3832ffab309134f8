use crate::app::lifecycle::context::StartupContext;
use crate::app::managers::{PublisherManager, SyncerManager};
use anyhow::{anyhow, Error};
use crate::pipeline::BlockingTask;
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct ManagersLoadTask;

impl BlockingTask<StartupContext, Error> for ManagersLoadTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config();
        let kv = ctx
            .kv
            .get()
            .ok_or_else(|| anyhow!("redis store not connected before manager load"))?
            .clone();

        let publisher_manager = Arc::new(PublisherManager::new(
            &config.publisher_auth.registered_publishers,
        ));
        publisher_manager.spawn_refresh(
            kv,
            Duration::from_secs(config.redis.bidder_refresh_secs.max(1)),
        );

        let syncer_manager = Arc::new(SyncerManager::new(config.usersync.syncers.clone()));

        ctx.publisher_manager
            .set(publisher_manager)
            .map_err(|_| anyhow!("publisher manager already initialized"))?;
        ctx.syncer_manager
            .set(syncer_manager)
            .map_err(|_| anyhow!("syncer manager already initialized"))?;

        Ok(())
    }
}
