//! `POST /cookie_sync`.

use crate::app::state::AppState;
use crate::core::models::pbs_cookie::PBSCookie;
use crate::core::models::privacy::PrivacyInfo;
use crate::core::models::syncer::SyncType;
use crate::core::privacy::tcf;
use crate::core::usersync::{build_sync_url, ChooseBidders};
use crate::core::usersync::chooser::ChooseBiddersInput;
use actix_web::{post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
struct FilterSettingsEntry {
    #[serde(default)]
    bidders: Vec<String>,
    /// `"include"` or `"exclude"`.
    #[serde(default)]
    filter: String,
}

#[derive(Debug, Default, Deserialize)]
struct FilterSettings {
    iframe: Option<FilterSettingsEntry>,
    image: Option<FilterSettingsEntry>,
}

impl FilterSettings {
    fn allows(&self, bidder: &str, sync_type: SyncType) -> bool {
        let entry = match sync_type {
            SyncType::Iframe => &self.iframe,
            SyncType::Redirect => &self.image,
        };
        match entry {
            None => true,
            Some(entry) => {
                let listed = entry.bidders.iter().any(|b| b == bidder);
                match entry.filter.as_str() {
                    "exclude" => !listed,
                    _ => listed || entry.bidders.is_empty(),
                }
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CookieSyncRequest {
    #[serde(default)]
    bidders: Vec<String>,
    #[serde(default)]
    gdpr: Option<i32>,
    #[serde(default)]
    gdpr_consent: Option<String>,
    #[serde(default)]
    us_privacy: Option<String>,
    #[serde(default)]
    gpp: Option<String>,
    #[serde(default)]
    gpp_sid: Vec<i32>,
    #[serde(default)]
    limit: i32,
    #[serde(default, rename = "coopSync")]
    coop_sync: bool,
    #[serde(default, rename = "filterSettings")]
    filter_settings: FilterSettings,
}

#[derive(Debug, Serialize)]
struct UserSync {
    url: String,
    #[serde(rename = "type")]
    sync_type: &'static str,
    #[serde(rename = "supportCORS")]
    support_cors: bool,
}

#[derive(Debug, Serialize)]
struct BidderStatus {
    bidder: String,
    no_cookie: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    usersync: Option<UserSync>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct CookieSyncResponse {
    status: &'static str,
    bidder_status: Vec<BidderStatus>,
}

fn gdpr_allows(gdpr_applies: bool, consent: Option<&str>) -> bool {
    if !gdpr_applies {
        return true;
    }
    match consent {
        Some(c) if !c.is_empty() => tcf::parse(c).is_ok(),
        _ => false,
    }
}

#[post("/cookie_sync")]
pub async fn cookie_sync(
    http_req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> HttpResponse {
    let req: CookieSyncRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(_) => {
            return HttpResponse::Ok().json(CookieSyncResponse {
                status: "error",
                bidder_status: Vec::new(),
            })
        }
    };

    let cookie = http_req
        .cookie("uids")
        .map(|c| PBSCookie::decode(c.value()))
        .unwrap_or_default();

    if cookie.opt_out {
        return HttpResponse::Ok().json(CookieSyncResponse {
            status: "no_cookie",
            bidder_status: Vec::new(),
        });
    }

    let gdpr_applies = req.gdpr.unwrap_or(0) == 1;
    let privacy = PrivacyInfo {
        gdpr_applies,
        gdpr_consent: req.gdpr_consent.clone(),
        us_privacy: req.us_privacy.clone(),
        gpp: req.gpp.clone(),
        gpp_sid: req.gpp_sid.clone(),
    };

    let syncers = state.syncer_manager.snapshot();
    let all_syncer_keys = state.syncer_manager.keys();
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    let usersync_config = state.config_manager.get().usersync.clone();

    let input = ChooseBiddersInput {
        requested: &req.bidders,
        cooperative: req.coop_sync || state.config_manager.get().cooperative_sync_auction,
        all_syncer_keys: &all_syncer_keys,
        syncers: &syncers,
        cookie: &cookie,
        now,
        sync_type_preference: &[SyncType::Iframe, SyncType::Redirect],
        gdpr_applies,
        limit: req.limit,
        default_limit: usersync_config.default_limit,
        max_limit: usersync_config.max_limit,
    };

    let consent = req.gdpr_consent.as_deref();
    let (accepted, rejected) = ChooseBidders::choose(
        &input,
        |_bidder| gdpr_allows(gdpr_applies, consent),
        |bidder, sync_type| req.filter_settings.allows(bidder, sync_type),
    );

    let base_url = state.config_manager.get().server.public_base_url.clone();

    let mut bidder_status: Vec<BidderStatus> = accepted
        .into_iter()
        .map(|bidder| {
            let syncer = syncers.get(&bidder);
            let usersync = syncer.and_then(|syncer| {
                let sync_type = syncer.choose_type(&[SyncType::Iframe, SyncType::Redirect]);
                build_sync_url(syncer, &[sync_type], &bidder, &base_url, &privacy).map(|url| {
                    UserSync {
                        url,
                        sync_type: match sync_type {
                            SyncType::Iframe => "iframe",
                            SyncType::Redirect => "redirect",
                        },
                        support_cors: syncer.support_cors,
                    }
                })
            });
            BidderStatus {
                bidder,
                no_cookie: true,
                usersync,
                error: None,
            }
        })
        .collect();

    bidder_status.extend(rejected.into_iter().filter_map(|(bidder, reason)| {
        if matches!(reason, crate::core::usersync::RejectReason::AlreadySynced) {
            None
        } else {
            Some(BidderStatus {
                bidder,
                no_cookie: false,
                usersync: None,
                error: Some(reason.to_string()),
            })
        }
    }));

    HttpResponse::Ok().json(CookieSyncResponse {
        status: "ok",
        bidder_status,
    })
}
