use crate::app::admission::api_key_cache::ApiKeyCache;
use crate::app::admission::publisher_auth::PublisherRateLimiters;
use crate::app::admission::ClientRateLimiters;
use crate::app::lifecycle::context::StartupContext;
use anyhow::{anyhow, Error};
use crate::pipeline::BlockingTask;
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct AdmissionInitTask;

impl BlockingTask<StartupContext, Error> for AdmissionInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config();

        let api_key_cache = Arc::new(ApiKeyCache::new());

        let client_rate_limiters =
            ClientRateLimiters::new(config.rate_limit.rps, config.rate_limit.burst);
        client_rate_limiters.spawn_sweeper(
            Duration::from_secs(config.rate_limit.idle_sweep_secs.max(1)),
            Duration::from_secs(config.rate_limit.idle_sweep_secs.max(1) * 10),
        );

        let publisher_rate_limiters = Arc::new(PublisherRateLimiters::new());

        ctx.api_key_cache
            .set(api_key_cache)
            .map_err(|_| anyhow!("api key cache already initialized"))?;
        ctx.client_rate_limiters
            .set(client_rate_limiters)
            .map_err(|_| anyhow!("client rate limiters already initialized"))?;
        ctx.publisher_rate_limiters
            .set(publisher_rate_limiters)
            .map_err(|_| anyhow!("publisher rate limiters already initialized"))?;

        Ok(())
    }
}
