//! Thin illustrative concrete adapters: each one is just the
//! generic configurable adapter pinned to a fixed [`BidderConfig`] shape,
//! demonstrating that a hand-written adapter is never required to onboard a
//! new demand source.

pub mod appnexus;
pub mod rubicon;
