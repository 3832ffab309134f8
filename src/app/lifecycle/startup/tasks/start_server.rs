use crate::app::admission::{api_key_auth, cors, publisher_auth, rate_limit, security_headers, size_limit};
use crate::app::admission::ClientRateLimiters;
use crate::app::handlers;
use crate::app::lifecycle::context::StartupContext;
use crate::app::state::AppState;
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Error};
use async_trait::async_trait;
use crate::pipeline::AsyncTask;
use tracing::info;

pub(crate) struct StartServerTask;

/// Wires the admission chain and handlers onto an `actix-web` `App`, binds,
/// and spawns the server in the background so startup can return without
/// blocking on the listener's lifetime.
#[async_trait]
impl AsyncTask<StartupContext, Error> for StartServerTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config();
        let http_port = config.server.http_port;

        let app_state = web::Data::new(AppState {
            config_manager: ctx
                .config_manager
                .get()
                .ok_or_else(|| anyhow!("config manager missing"))?
                .clone(),
            registry: ctx
                .registry
                .get()
                .ok_or_else(|| anyhow!("bidder registry missing"))?
                .clone(),
            orchestrator: ctx
                .orchestrator
                .get()
                .ok_or_else(|| anyhow!("auction orchestrator missing"))?
                .clone(),
            kv: ctx.kv.get().ok_or_else(|| anyhow!("redis store missing"))?.clone(),
            publisher_manager: ctx
                .publisher_manager
                .get()
                .ok_or_else(|| anyhow!("publisher manager missing"))?
                .clone(),
            syncer_manager: ctx
                .syncer_manager
                .get()
                .ok_or_else(|| anyhow!("syncer manager missing"))?
                .clone(),
            api_key_cache: ctx
                .api_key_cache
                .get()
                .ok_or_else(|| anyhow!("api key cache missing"))?
                .clone(),
            publisher_rate_limiters: ctx
                .publisher_rate_limiters
                .get()
                .ok_or_else(|| anyhow!("publisher rate limiters missing"))?
                .clone(),
            client_rate_limiters: ctx
                .client_rate_limiters
                .get()
                .ok_or_else(|| anyhow!("client rate limiters missing"))?
                .clone(),
            idr: ctx
                .idr
                .get()
                .ok_or_else(|| anyhow!("idr client slot missing"))?
                .clone(),
        });

        let client_rate_limiters: web::Data<std::sync::Arc<ClientRateLimiters>> =
            web::Data::new(app_state.client_rate_limiters.clone());
        let size_limit_cfg = web::Data::new(config.size_limit.clone());
        let security_headers_cfg = web::Data::new(config.security_headers.clone());
        let cors_cfg = web::Data::new(config.cors.clone());
        let auth_cfg = web::Data::new(config.auth.clone());
        let publisher_auth_cfg = web::Data::new(config.publisher_auth.clone());
        let rate_limit_cfg = web::Data::new(config.rate_limit.clone());
        let publisher_manager = web::Data::from(app_state.publisher_manager.clone());
        let publisher_rate_limiters = web::Data::from(app_state.publisher_rate_limiters.clone());
        let api_key_cache = web::Data::from(app_state.api_key_cache.clone());
        let kv_data = web::Data::new(app_state.kv.clone());

        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .app_data(client_rate_limiters.clone())
                .app_data(size_limit_cfg.clone())
                .app_data(security_headers_cfg.clone())
                .app_data(cors_cfg.clone())
                .app_data(auth_cfg.clone())
                .app_data(publisher_auth_cfg.clone())
                .app_data(rate_limit_cfg.clone())
                .app_data(publisher_manager.clone())
                .app_data(publisher_rate_limiters.clone())
                .app_data(api_key_cache.clone())
                .app_data(kv_data.clone())
                // `.wrap()` composes outermost-last: the admission chain's
                // spec order (size limit -> security headers -> CORS ->
                // API-key auth -> publisher auth -> rate limit) is this
                // list reversed.
                .wrap(from_fn(rate_limit::rate_limit))
                .wrap(from_fn(publisher_auth::publisher_auth))
                .wrap(from_fn(api_key_auth::api_key_auth))
                .wrap(from_fn(cors::cors))
                .wrap(from_fn(security_headers::security_headers))
                .wrap(from_fn(size_limit::size_limit))
                .configure(handlers::configure)
        })
        .bind(("0.0.0.0", http_port))?
        .run();

        let handle = server.handle();
        tokio::spawn(server);

        ctx.server_handle
            .set(handle)
            .map_err(|_| anyhow!("server handle already set"))?;

        info!(port = http_port, "http server listening");
        Ok(())
    }
}
