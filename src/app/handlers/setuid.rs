//! `GET|POST /setuid`.

use crate::app::config::CookieConfig;
use crate::app::state::AppState;
use crate::core::models::pbs_cookie::PBSCookie;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

/// A 1x1 transparent GIF, the conventional tracking-pixel response body.
const PIXEL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3B,
];

#[derive(Debug, Default, Deserialize)]
pub struct SetuidQuery {
    bidder: Option<String>,
    uid: Option<String>,
    gdpr: Option<String>,
    gdpr_consent: Option<String>,
    f: Option<String>,
}

fn render(format: &str, bidder: &str, success: bool) -> HttpResponse {
    match format {
        "i" => HttpResponse::Ok().content_type("image/gif").body(PIXEL_GIF),
        "b" => HttpResponse::Ok().finish(),
        "j" => HttpResponse::Ok().json(json!({ "bidder": bidder, "success": success })),
        _ => HttpResponse::Ok().content_type("image/gif").body(PIXEL_GIF),
    }
}

pub(crate) fn build_cookie(cookie: &PBSCookie, config: &CookieConfig) -> Cookie<'static> {
    let mut builder = Cookie::build("uids", cookie.encode())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .max_age(CookieDuration::seconds(config.max_age_secs));
    if let Some(domain) = &config.domain {
        builder = builder.domain(domain.clone());
    }
    builder.finish()
}

async fn handle(req: HttpRequest, query: web::Query<SetuidQuery>, state: web::Data<AppState>) -> HttpResponse {
    let format = query.f.as_deref().unwrap_or("");
    let bidder = match &query.bidder {
        Some(b) if state.syncer_manager.get(b).is_some() => b.clone(),
        _ => return HttpResponse::BadRequest().json(json!({ "error": "unknown bidder" })),
    };

    let mut cookie = req
        .cookie("uids")
        .map(|c| PBSCookie::decode(c.value()))
        .unwrap_or_default();

    if cookie.opt_out {
        return render(format, &bidder, false);
    }

    let gdpr_applies = query.gdpr.as_deref() == Some("1");
    let consent_missing = query.gdpr_consent.as_deref().unwrap_or("").is_empty();
    if gdpr_applies && consent_missing {
        return render(format, &bidder, false);
    }

    match query.uid.as_deref() {
        None | Some("") | Some("0") => cookie.remove_uid(&bidder),
        Some(uid) => cookie.set_uid(&bidder, uid.to_string(), None),
    }

    let cookie_config = state.config_manager.get().usersync.cookie.clone();
    let mut response = render(format, &bidder, true);
    let _ = response
        .add_cookie(&build_cookie(&cookie, &cookie_config))
        .map_err(|e| tracing::warn!(error = %e, "failed to attach uids cookie"));
    response
}

#[get("/setuid")]
pub async fn setuid_get(req: HttpRequest, query: web::Query<SetuidQuery>, state: web::Data<AppState>) -> HttpResponse {
    handle(req, query, state).await
}

#[post("/setuid")]
pub async fn setuid_post(req: HttpRequest, query: web::Query<SetuidQuery>, state: web::Data<AppState>) -> HttpResponse {
    handle(req, query, state).await
}
