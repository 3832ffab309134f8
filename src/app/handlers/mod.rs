//! HTTP endpoint handlers.

pub mod auction;
pub mod cookie_sync;
pub mod info_bidders;
pub mod optout;
pub mod setuid;
pub mod status;

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        actix_web::web::resource("/openrtb2/auction")
            .route(actix_web::web::post().to(auction::auction))
            .default_service(actix_web::web::to(auction::method_not_allowed)),
    )
    .service(status::status)
    .service(info_bidders::info_bidders)
    .service(cookie_sync::cookie_sync)
    .service(setuid::setuid_get)
    .service(setuid::setuid_post)
    .service(optout::optout);
}
