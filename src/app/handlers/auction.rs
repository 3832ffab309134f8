//! `POST /openrtb2/auction`: parses the request,
//! runs the privacy gate, then the auction orchestrator.

use crate::app::privacy_gate;
use crate::app::state::AppState;
use crate::core::auction::AuctionOptions;
use crate::core::openrtb::BidRequest;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use std::time::{Duration, Instant};

pub async fn auction(
    http_req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let start = Instant::now();

    let req: BidRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return HttpResponse::BadRequest().json(json!({ "error": format!("invalid bid request: {e}") }))
        }
    };

    if req.imp.is_empty() || req.imp.iter().any(|imp| imp.media_types().is_empty()) {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "every impression must declare at least one media type" }));
    }

    let privacy_config = state.config_manager.get().privacy.clone();
    if let Err(rejection) = privacy_gate::evaluate(&req, &privacy_config) {
        return rejection.into_response();
    }

    let debug = http_req
        .query_string()
        .split('&')
        .any(|pair| pair == "debug=1");

    let cooperative_sync = state.config_manager.get().cooperative_sync_auction;
    let server_max_tmax = Duration::from_millis(state.config_manager.get().server.max_tmax_ms.max(1));

    let suggested_bidders = match &state.idr {
        Some(idr) => {
            let idr_request = crate::app::idr::IdrRequest {
                publisher_id: req.publisher_id(),
                domain: req.domain(),
            };
            idr.suggest(&idr_request)
                .await
                .map(|s| s.suggested_bidders)
                .unwrap_or_default()
        }
        None => Vec::new(),
    };

    let options = AuctionOptions {
        cooperative_sync,
        debug,
        server_max_tmax,
        suggested_bidders,
    };

    let response = state.orchestrator.run(&req, options).await;
    let status_code = 200u16;
    let bidder_count = response.seatbid.iter().map(|s| s.bid.len()).sum::<usize>();
    crate::app::metrics::record_auction(status_code, bidder_count, start.elapsed());

    HttpResponse::Ok().json(response)
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(json!({ "error": "method not allowed" }))
}
