use crate::app::lifecycle::context::StartupContext;
use crate::app::observability;
use anyhow::{anyhow, Error};
use crate::pipeline::BlockingTask;
use tracing::info;

pub(crate) struct ObservabilityTask;

impl BlockingTask<StartupContext, Error> for ObservabilityTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let manager = ctx
            .config_manager
            .get()
            .ok_or_else(|| anyhow!("config not loaded before observability init"))?;

        if let Some(provider) = observability::init(&manager.get().logging)? {
            ctx.observability
                .set(provider)
                .map_err(|_| anyhow!("observability already initialized"))?;
        }

        info!("observability configured");
        Ok(())
    }
}
