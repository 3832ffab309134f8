//! The admission chain: a fixed sequence of `actix-web`
//! `from_fn` middlewares wired onto `App` in `main.rs`. Each is an
//! independent no-op when its own config section is disabled.
//!
//! `.wrap()` composes outermost-last, so the registration order in
//! `main.rs` is the reverse of this module list (size limiter first in
//! spec order == last `.wrap()` call).

pub mod api_key_auth;
pub mod api_key_cache;
pub mod cors;
pub mod publisher_auth;
pub mod rate_limit;
pub mod security_headers;
pub mod size_limit;

pub use rate_limit::ClientRateLimiters;
