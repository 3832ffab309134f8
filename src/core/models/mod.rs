pub mod bidder_config;
pub mod pbs_cookie;
pub mod privacy;
pub mod publisher;
pub mod syncer;
