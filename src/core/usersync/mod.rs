//! User-sync URL building and bidder choosing. The cookie
//! codec itself lives in [`crate::core::models::pbs_cookie`].

pub mod chooser;
pub mod url_builder;

pub use chooser::{ChooseBidders, RejectReason};
pub use url_builder::build_sync_url;
