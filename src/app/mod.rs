//! HTTP/process layer: wires the domain in `core` to `actix-web` (config,
//! admission chain, handlers, lifecycle/bootstrap).

pub mod admission;
pub mod config;
pub mod config_manager;
pub mod errors;
pub mod handlers;
pub mod idr;
pub mod lifecycle;
pub mod managers;
pub mod metrics;
pub mod observability;
pub mod privacy_gate;
pub mod state;
