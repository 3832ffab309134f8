use crate::app::lifecycle::context::StartupContext;
use crate::app::observability;
use anyhow::Error;
use async_trait::async_trait;
use crate::pipeline::AsyncTask;

pub(crate) struct ObservabilityShutdownTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for ObservabilityShutdownTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        if let Some(provider) = ctx.observability.get() {
            observability::shutdown(provider)?;
        }
        Ok(())
    }
}
