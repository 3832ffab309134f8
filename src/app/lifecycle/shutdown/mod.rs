pub(crate) mod tasks;

use crate::app::lifecycle::context::StartupContext;
use crate::pipeline::{Pipeline, PipelineBuilder};
use tasks::observability::ObservabilityShutdownTask;
use tasks::registry_refresh::StopRegistryRefreshTask;
use tasks::stop_server::StopServerTask;

/// Stops accepting new connections, stops the background bidder-registry
/// refresh loop, then flushes the tracer provider last so no in-flight
/// request's or shutdown-stage's spans get dropped mid-export.
pub fn build_shutdown_pipeline() -> Pipeline<StartupContext, anyhow::Error> {
    PipelineBuilder::new()
        .with_async(Box::new(StopServerTask))
        .with_async(Box::new(StopRegistryRefreshTask))
        .with_async(Box::new(ObservabilityShutdownTask))
        .build()
        .expect("shutdown pipeline should have tasks")
}
