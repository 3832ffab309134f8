use crate::app::lifecycle::context::StartupContext;
use crate::core::kv::RedisKvStore;
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use crate::pipeline::AsyncTask;
use tracing::info;

pub(crate) struct RedisConnectTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for RedisConnectTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config();
        let kv = RedisKvStore::new(&config.redis.url)?;
        kv.ping().await?;

        ctx.kv
            .set(kv)
            .map_err(|_| anyhow!("redis store already initialized"))?;

        info!("connected to redis");
        Ok(())
    }
}
