//! IDR client: a narrow contract for the external
//! identity-decisioning service the core consults for partner-selection
//! suggestions. Out of scope as a subsystem to implement ourselves (it's
//! an external collaborator) — this is just the client shape the
//! orchestrator would call through, built the same way as
//! [`crate::core::auction::demand_client::DemandClient`] (shared
//! `reqwest::Client`, bounded timeout, no retries).

use crate::app::config::IdrConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct IdrRequest {
    pub publisher_id: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdrSuggestion {
    /// Bidder codes the service suggests including, additive to whatever
    /// `imp[].ext.prebid.bidder` already names.
    #[serde(default)]
    pub suggested_bidders: Vec<String>,
}

#[derive(Clone)]
pub struct IdrClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl IdrClient {
    pub fn new(config: &IdrConfig) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent("nexus-idr-client").build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms.max(1)),
        })
    }

    /// Best-effort: any failure (timeout, connection error, bad JSON)
    /// yields `None` rather than failing the auction — this is an
    /// advisory signal, never a hard dependency.
    pub async fn suggest(&self, request: &IdrRequest) -> Option<IdrSuggestion> {
        let url = format!("{}/suggest", self.base_url);
        let send = self.client.post(&url).json(request).send();
        let response = tokio::time::timeout(self.timeout, send).await.ok()?.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<IdrSuggestion>().await.ok()
    }
}
