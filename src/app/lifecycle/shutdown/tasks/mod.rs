pub(crate) mod observability;
pub(crate) mod registry_refresh;
pub(crate) mod stop_server;
