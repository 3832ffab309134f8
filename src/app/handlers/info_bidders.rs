//! `GET /info/bidders`: unique bidder codes across both
//! registries. There is only one registry in this crate (static
//! registrations and dynamic `Provider` events both land in
//! [`crate::core::registry::BidderRegistry`]), so this is simply its
//! current key set.

use crate::app::state::AppState;
use actix_web::{get, web, HttpResponse};

#[get("/info/bidders")]
pub async fn info_bidders(state: web::Data<AppState>) -> HttpResponse {
    let mut codes = state.registry.list_bidders();
    codes.sort();
    HttpResponse::Ok().json(codes)
}
