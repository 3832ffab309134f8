//! `SyncerConfig` — describes how to build a bidder's user-sync URL.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Iframe,
    Redirect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncerConfig {
    /// May differ from the bidder code (e.g. `appnexus` bidder uses the
    /// `adnxs` syncer key).
    pub key: String,
    pub supports: HashSet<SyncType>,
    pub default: SyncType,
    pub iframe_url: Option<String>,
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub support_cors: bool,
    /// Literal macro token in the bidder's own URL standing for our
    /// redirect URL, e.g. `{{redirect_url}}`.
    pub user_macro: String,
}

impl SyncerConfig {
    /// Template for the chosen sync type, if configured.
    pub fn template(&self, sync_type: SyncType) -> Option<&str> {
        match sync_type {
            SyncType::Iframe => self.iframe_url.as_deref(),
            SyncType::Redirect => self.redirect_url.as_deref(),
        }
    }

    /// Chooses a sync type from `preference` (in order), falling back to
    /// `default` if none of the preferences are supported.
    pub fn choose_type(&self, preference: &[SyncType]) -> SyncType {
        preference
            .iter()
            .copied()
            .find(|t| self.supports.contains(t))
            .unwrap_or(self.default)
    }
}
