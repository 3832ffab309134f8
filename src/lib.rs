//! `nexus` — a Prebid-Server-shaped header-bidding auction engine.
//!
//! `core` holds the auction domain (adapters, registries, privacy, user-sync)
//! with no HTTP dependency; `app` wires that domain to `actix-web` (config,
//! admission chain, handlers, process bootstrap). `pipeline` is the small
//! ordered-task abstraction both startup/shutdown and (indirectly) the
//! admission chain are described in terms of.

pub mod app;
pub mod core;
pub mod pipeline;
