//! `BidderConfig` — the dynamic, hot-reloadable description of one bidder
//! endpoint. Instances live in the dynamic registry, keyed by
//! `bidder_code`, and are what the generic configurable adapter is built
//! from.

use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum BidderStatus {
    Active,
    Testing,
    Disabled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Post,
    Get,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Bearer,
    Header,
}

/// Authentication material for an outbound bidder endpoint.
///
/// `Debug` hides credential values so they never end up in logs — the
/// exchange uses `derivative` for the same purpose on config structs that
/// carry secrets.
#[derive(Clone, Serialize, Deserialize, Default, Derivative)]
#[derivative(Debug)]
#[serde(default)]
pub struct Auth {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    #[derivative(Debug = "ignore")]
    pub username: Option<String>,
    #[derivative(Debug = "ignore")]
    pub password: Option<String>,
    #[derivative(Debug = "ignore")]
    pub token: Option<String>,
    /// Only used when `auth_type == Header`.
    pub header_name: Option<String>,
    #[derivative(Debug = "ignore")]
    pub header_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[serde(default)]
pub struct Endpoint {
    pub url: String,
    pub method: HttpMethod,
    pub timeout_ms: u64,
    pub protocol_version: String,
    pub auth: Auth,
    pub custom_headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Capabilities {
    pub media_types: Vec<String>,
    pub currencies: Vec<String>,
    pub site_enabled: bool,
    pub app_enabled: bool,
    pub supports_gdpr: bool,
    pub supports_ccpa: bool,
    pub supports_schain: bool,
}

impl Capabilities {
    /// Sensible defaults for a freshly-defined bidder: every media type and
    /// channel on, no currency restriction.
    pub fn permissive() -> Self {
        Self {
            media_types: vec![
                "banner".into(),
                "video".into(),
                "native".into(),
                "audio".into(),
            ],
            currencies: Vec::new(),
            site_enabled: true,
            app_enabled: true,
            supports_gdpr: true,
            supports_ccpa: true,
            supports_schain: true,
        }
    }
}

/// An SChain node to append when `schain_augment.enabled` is set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchainNodeConfig {
    pub asi: String,
    pub sid: String,
    pub hp: i32,
    #[serde(default)]
    pub rid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SchainAugment {
    pub enabled: bool,
    pub nodes: Vec<SchainNodeConfig>,
    /// Overrides `complete` on the (possibly newly-created) schain object
    /// when present; otherwise the existing/default value is kept.
    pub complete: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RequestTransform {
    /// Deep-merged into `imp[].ext` for every impression.
    pub imp_ext_template: Option<serde_json::Value>,
    /// Deep-merged into the top-level request `ext`.
    pub request_ext_template: Option<serde_json::Value>,
    /// Deep-merged into `site.ext`.
    pub site_ext_template: Option<serde_json::Value>,
    /// Deep-merged into `user.ext`.
    pub user_ext_template: Option<serde_json::Value>,
    pub schain_augment: SchainAugment,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResponseTransform {
    /// Multiplicative adjustment applied to every returned bid's price.
    /// Skipped entirely when 0 or 1.0.
    pub price_adjustment: f64,
    pub creative_type_mappings: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RateLimits {
    pub qps: u32,
    pub daily: u64,
    pub concurrent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct BidderConfig {
    pub bidder_code: String,
    pub endpoint: Endpoint,
    pub capabilities: Capabilities,
    pub request_transform: RequestTransform,
    pub response_transform: ResponseTransform,
    pub rate_limits: RateLimits,
    pub allowed_publishers: Vec<String>,
    pub blocked_publishers: Vec<String>,
    pub allowed_countries: Vec<String>,
    pub blocked_countries: Vec<String>,
    pub status: BidderStatus,
    pub gvl_vendor_id: Option<u32>,
    pub priority: i32,
}

impl Default for BidderConfig {
    fn default() -> Self {
        Self {
            bidder_code: String::new(),
            endpoint: Endpoint::default(),
            capabilities: Capabilities::permissive(),
            request_transform: RequestTransform::default(),
            response_transform: ResponseTransform::default(),
            rate_limits: RateLimits::default(),
            allowed_publishers: Vec::new(),
            blocked_publishers: Vec::new(),
            allowed_countries: Vec::new(),
            blocked_countries: Vec::new(),
            status: BidderStatus::Testing,
            gvl_vendor_id: None,
            priority: 0,
        }
    }
}

#[derive(Debug)]
pub struct ConfigValidationError(pub String);

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for ConfigValidationError {}

impl BidderConfig {
    /// Checks that `endpoint.url` is non-empty when the bidder can actually
    /// be selected, and that `timeout_ms` is bounded by the global tmax
    /// ceiling.
    pub fn validate(&self, global_tmax_ms: u64) -> Result<(), ConfigValidationError> {
        if self.bidder_code.trim().is_empty() {
            return Err(ConfigValidationError("bidder_code must not be empty".into()));
        }
        if matches!(self.status, BidderStatus::Active | BidderStatus::Testing)
            && self.endpoint.url.trim().is_empty()
        {
            return Err(ConfigValidationError(format!(
                "bidder {} has no endpoint.url but status is {}",
                self.bidder_code, self.status
            )));
        }
        if self.endpoint.timeout_ms > global_tmax_ms {
            return Err(ConfigValidationError(format!(
                "bidder {} timeout_ms {} exceeds global tmax {}",
                self.bidder_code, self.endpoint.timeout_ms, global_tmax_ms
            )));
        }
        Ok(())
    }

    pub fn can_bid_for_publisher(&self, publisher_id: &str) -> bool {
        if self.blocked_publishers.iter().any(|p| p == publisher_id) {
            return false;
        }
        self.allowed_publishers.is_empty()
            || self.allowed_publishers.iter().any(|p| p == publisher_id)
    }

    pub fn can_bid_for_country(&self, country: &str) -> bool {
        let country = country.to_ascii_uppercase();
        if self
            .blocked_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&country))
        {
            return false;
        }
        self.allowed_countries.is_empty()
            || self
                .allowed_countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&country))
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.status, BidderStatus::Active | BidderStatus::Testing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BidderConfig {
        BidderConfig {
            bidder_code: "acme".into(),
            endpoint: Endpoint {
                url: "https://acme.example/bid".into(),
                timeout_ms: 100,
                ..Default::default()
            },
            status: BidderStatus::Active,
            ..Default::default()
        }
    }

    #[test]
    fn validate_rejects_empty_endpoint_for_active() {
        let mut cfg = base();
        cfg.endpoint.url.clear();
        assert!(cfg.validate(300).is_err());
    }

    #[test]
    fn validate_rejects_timeout_over_global_tmax() {
        let cfg = base();
        assert!(cfg.validate(50).is_err());
        assert!(cfg.validate(300).is_ok());
    }

    #[test]
    fn publisher_policy_blocklist_wins_over_allowlist() {
        let mut cfg = base();
        cfg.allowed_publishers = vec!["pub1".into()];
        cfg.blocked_publishers = vec!["pub1".into()];
        assert!(!cfg.can_bid_for_publisher("pub1"));
    }

    #[test]
    fn publisher_policy_empty_allowlist_means_any() {
        let cfg = base();
        assert!(cfg.can_bid_for_publisher("anyone"));
    }

    #[test]
    fn country_policy_is_case_insensitive() {
        let mut cfg = base();
        cfg.allowed_countries = vec!["US".into()];
        assert!(cfg.can_bid_for_country("us"));
        assert!(!cfg.can_bid_for_country("ca"));
    }
}
