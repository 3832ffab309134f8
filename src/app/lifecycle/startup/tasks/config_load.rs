use crate::app::config_manager::ConfigManager;
use crate::app::lifecycle::context::StartupContext;
use anyhow::{anyhow, Error};
use crate::pipeline::BlockingTask;
use std::sync::Arc;

pub(crate) struct ConfigLoadTask;

impl BlockingTask<StartupContext, Error> for ConfigLoadTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let path = ctx
            .config_path
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| anyhow!("no config path set on startup context"))?;

        let manager = Arc::new(ConfigManager::new(path));
        manager.start()?;

        ctx.config_manager
            .set(manager)
            .map_err(|_| anyhow!("config manager already initialized"))?;

        Ok(())
    }
}
