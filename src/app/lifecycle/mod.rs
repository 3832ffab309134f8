//! Process bootstrap: an ordered startup pipeline that loads config, wires
//! every subsystem, and starts the HTTP listener, paired with a shutdown
//! pipeline that reverses the parts of that which need an orderly stop.

pub mod context;
pub mod shutdown;
pub mod startup;

pub use context::StartupContext;
pub use shutdown::build_shutdown_pipeline;
pub use startup::build_start_pipeline;
