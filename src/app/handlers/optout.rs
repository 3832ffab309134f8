//! `POST /optout`.

use crate::app::handlers::setuid::build_cookie;
use crate::app::state::AppState;
use crate::core::models::pbs_cookie::PBSCookie;
use actix_web::{post, web, HttpRequest, HttpResponse};

#[post("/optout")]
pub async fn optout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = req
        .cookie("uids")
        .map(|c| PBSCookie::decode(c.value()))
        .unwrap_or_default();
    cookie.set_opt_out(true);

    let cookie_config = state.config_manager.get().usersync.cookie.clone();
    let mut response = HttpResponse::Ok().finish();
    let _ = response
        .add_cookie(&build_cookie(&cookie, &cookie_config))
        .map_err(|e| tracing::warn!(error = %e, "failed to attach uids cookie"));
    response
}
