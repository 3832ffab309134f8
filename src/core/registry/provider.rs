//! A push-listener abstraction over a Redis-poll source: start, yield an
//! initial snapshot, then emit events as it notices changes.

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub enum ProviderEvent<T> {
    Added(T),
    Modified(T),
    Removed(String),
}

/// Closes a provider's background refresh loop. Dropping it without calling
/// [`stop`](ProviderStopHandle::stop) leaves the loop running. Callers that
/// own a provider for the life of the process should store this and stop it
/// explicitly during shutdown.
#[derive(Clone)]
pub struct ProviderStopHandle(tokio::sync::watch::Sender<bool>);

impl ProviderStopHandle {
    pub fn new(sender: tokio::sync::watch::Sender<bool>) -> Self {
        Self(sender)
    }

    /// Signals the refresh loop to exit on its next tick or select. A
    /// closed receiver (loop already gone) is not an error.
    pub fn stop(&self) {
        let _ = self.0.send(true);
    }
}

#[async_trait]
pub trait Provider<T>: Send + Sync {
    /// Returns the initial snapshot plus a handle to stop the background
    /// refresh loop, and begins invoking `on_event` for every subsequent
    /// change until stopped or dropped.
    async fn start(
        &self,
        on_event: Box<dyn Fn(ProviderEvent<T>) + Send + Sync>,
    ) -> Result<(Vec<T>, ProviderStopHandle), anyhow::Error>;
}
