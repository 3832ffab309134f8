pub(crate) mod tasks;

use crate::app::lifecycle::context::StartupContext;
use crate::pipeline::{Pipeline, PipelineBuilder};
use std::path::PathBuf;
use tasks::admission_init::AdmissionInitTask;
use tasks::config_load::ConfigLoadTask;
use tasks::idr_init::IdrInitTask;
use tasks::managers_load::ManagersLoadTask;
use tasks::observability::ObservabilityTask;
use tasks::orchestrator_load::OrchestratorLoadTask;
use tasks::redis_connect::RedisConnectTask;
use tasks::registry_load::RegistryLoadTask;
use tasks::start_server::StartServerTask;

/// Builds the ordered startup pipeline: config and logging come first since
/// everything after them wants to log, Redis and the registry come before
/// anything that reads from them, and the server binds last.
pub fn build_start_pipeline(cfg_path: PathBuf) -> (StartupContext, Pipeline<StartupContext, anyhow::Error>) {
    let ctx = StartupContext::default();
    *ctx.config_path.lock().unwrap() = Some(cfg_path);

    let pipeline = PipelineBuilder::new()
        .with_blocking(Box::new(ConfigLoadTask))
        .with_blocking(Box::new(ObservabilityTask))
        .with_async(Box::new(RedisConnectTask))
        .with_async(Box::new(RegistryLoadTask))
        .with_blocking(Box::new(OrchestratorLoadTask))
        .with_blocking(Box::new(ManagersLoadTask))
        .with_blocking(Box::new(AdmissionInitTask))
        .with_blocking(Box::new(IdrInitTask))
        .with_async(Box::new(StartServerTask))
        .build()
        .expect("startup pipeline should have tasks");

    (ctx, pipeline)
}
