use crate::app::lifecycle::context::StartupContext;
use anyhow::Error;
use async_trait::async_trait;
use crate::pipeline::AsyncTask;
use tracing::info;

pub(crate) struct StopServerTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for StopServerTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        match ctx.server_handle.get() {
            Some(handle) => {
                handle.stop(true).await;
                info!("http server stopped");
            }
            None => info!("skipping server shutdown, was never started"),
        }
        Ok(())
    }
}
