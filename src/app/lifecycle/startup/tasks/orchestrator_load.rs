use crate::app::lifecycle::context::StartupContext;
use crate::core::auction::demand_client::DemandClient;
use crate::core::auction::AuctionOrchestrator;
use anyhow::{anyhow, Error};
use crate::pipeline::BlockingTask;
use std::sync::Arc;

pub(crate) struct OrchestratorLoadTask;

impl BlockingTask<StartupContext, Error> for OrchestratorLoadTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let registry = ctx
            .registry
            .get()
            .ok_or_else(|| anyhow!("bidder registry not loaded before orchestrator build"))?
            .clone();

        let demand_client = DemandClient::new()?;
        let orchestrator = Arc::new(AuctionOrchestrator::new(registry, demand_client));

        ctx.orchestrator
            .set(orchestrator)
            .map_err(|_| anyhow!("orchestrator already initialized"))?;

        Ok(())
    }
}
