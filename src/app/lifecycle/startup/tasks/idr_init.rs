use crate::app::idr::IdrClient;
use crate::app::lifecycle::context::StartupContext;
use anyhow::{anyhow, Error};
use crate::pipeline::BlockingTask;
use std::sync::Arc;

pub(crate) struct IdrInitTask;

impl BlockingTask<StartupContext, Error> for IdrInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config();

        let idr = if config.idr.enabled {
            Some(Arc::new(IdrClient::new(&config.idr)?))
        } else {
            None
        };

        ctx.idr
            .set(idr)
            .map_err(|_| anyhow!("idr client already initialized"))?;

        Ok(())
    }
}
