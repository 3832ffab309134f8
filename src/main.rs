use nexus::app::lifecycle::{build_shutdown_pipeline, build_start_pipeline};
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[actix_web::main]
async fn main() {
    let cfg_path = std::env::var("NEXUS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("nexus.yaml"));

    let (ctx, startup_pipeline) = build_start_pipeline(cfg_path);

    match startup_pipeline.run(&ctx).await {
        Ok(_) => tracing::info!("startup complete"),
        Err(e) => panic!("startup failed: {e:?}"),
    }

    let shutdown_pipeline = build_shutdown_pipeline();

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl_c");

    match shutdown_pipeline.run(&ctx).await {
        Ok(_) => println!("shutdown complete"),
        Err(e) => panic!("shutdown failed: {e:?}"),
    }
}
