//! End-to-end exercise of `POST /openrtb2/auction` through the real
//! `actix-web` service stack: JSON in, JSON out, no bidders configured so
//! the response is a deterministic empty seatbid rather than depending on
//! network access.

use actix_web::{test, web, App};
use nexus::app::admission::api_key_cache::ApiKeyCache;
use nexus::app::admission::publisher_auth::PublisherRateLimiters;
use nexus::app::admission::ClientRateLimiters;
use nexus::app::config_manager::ConfigManager;
use nexus::app::handlers;
use nexus::app::idr;
use nexus::app::managers::{PublisherManager, SyncerManager};
use nexus::app::state::AppState;
use nexus::core::auction::demand_client::DemandClient;
use nexus::core::auction::AuctionOrchestrator;
use nexus::core::kv::RedisKvStore;
use nexus::core::registry::BidderRegistry;
use std::sync::Arc;

fn test_state() -> web::Data<AppState> {
    let registry = Arc::new(BidderRegistry::new());
    let demand_client = DemandClient::new().expect("demand client builds");
    let orchestrator = Arc::new(AuctionOrchestrator::new(registry.clone(), demand_client));
    let kv = RedisKvStore::new("redis://127.0.0.1:6379").expect("client config is valid");

    web::Data::new(AppState {
        config_manager: Arc::new(ConfigManager::new("nexus.yaml".into())),
        registry,
        orchestrator,
        kv,
        publisher_manager: Arc::new(PublisherManager::new(&[])),
        syncer_manager: Arc::new(SyncerManager::new(Default::default())),
        api_key_cache: Arc::new(ApiKeyCache::new()),
        publisher_rate_limiters: Arc::new(PublisherRateLimiters::new()),
        client_rate_limiters: ClientRateLimiters::new(1000, 1000),
        idr: None,
    })
}

#[actix_web::test]
async fn auction_with_no_named_bidders_returns_empty_seatbid() {
    let state = test_state();
    state.config_manager.start().expect("default config loads");

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure),
    )
    .await;

    let body = serde_json::json!({
        "id": "req-1",
        "imp": [{"id": "imp-1", "banner": {"w": 300, "h": 250}}],
    });

    let req = test::TestRequest::post()
        .uri("/openrtb2/auction")
        .set_json(&body)
        .to_request();

    let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resp["id"], "req-1");
    assert!(resp["seatbid"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn auction_rejects_impression_with_no_media_type() {
    let state = test_state();
    state.config_manager.start().expect("default config loads");

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure),
    )
    .await;

    let body = serde_json::json!({
        "id": "req-2",
        "imp": [{"id": "imp-1"}],
    });

    let req = test::TestRequest::post()
        .uri("/openrtb2/auction")
        .set_json(&body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn coppa_flagged_request_is_rejected_before_the_auction_runs() {
    let state = test_state();
    state.config_manager.start().expect("default config loads");

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure),
    )
    .await;

    let body = serde_json::json!({
        "id": "req-3",
        "imp": [{"id": "imp-1", "banner": {"w": 300, "h": 250}}],
        "regs": {"coppa": 1},
    });

    let req = test::TestRequest::post()
        .uri("/openrtb2/auction")
        .set_json(&body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn idr_suggestion_is_advisory_and_ignored_when_absent() {
    // With no IDR client configured, `AppState::idr` is `None` and the
    // handler must fall back to an empty suggestion list without erroring.
    let state = test_state();
    assert!(state.idr.is_none());
    let _ = idr::IdrRequest {
        publisher_id: None,
        domain: None,
    };
}
