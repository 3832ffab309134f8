use crate::app::lifecycle::context::StartupContext;
use anyhow::Error;
use async_trait::async_trait;
use crate::pipeline::AsyncTask;
use tracing::info;

pub(crate) struct StopRegistryRefreshTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for StopRegistryRefreshTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        match ctx.registry_refresh_stop.get() {
            Some(handle) => {
                handle.stop();
                info!("bidder registry refresh loop stopped");
            }
            None => info!("skipping registry refresh shutdown, was never started"),
        }
        Ok(())
    }
}
