//! Rubicon (Magnite) wraps the generic configurable adapter; it differs
//! from [`super::appnexus`] only in its default endpoint and auth shape.

use crate::core::adapter::generic::GenericConfigurableAdapter;
use crate::core::adapter::{Adapter, AdapterError, ExtraRequestInfo, RequestData, ResponseData};
use crate::core::models::bidder_config::{Auth, AuthType, BidderConfig, BidderStatus, Endpoint, HttpMethod};
use crate::core::openrtb::BidRequest;

pub const BIDDER_CODE: &str = "rubicon";

pub fn default_config() -> BidderConfig {
    BidderConfig {
        bidder_code: BIDDER_CODE.into(),
        endpoint: Endpoint {
            url: "https://exapi-us-east.rubiconproject.com/exchange/openrtb2".into(),
            method: HttpMethod::Post,
            protocol_version: "2.5".into(),
            auth: Auth {
                auth_type: AuthType::Basic,
                ..Default::default()
            },
            ..Default::default()
        },
        status: BidderStatus::Active,
        ..Default::default()
    }
}

pub struct RubiconAdapter(GenericConfigurableAdapter);

impl RubiconAdapter {
    pub fn new(config: BidderConfig) -> Self {
        Self(GenericConfigurableAdapter::new(config))
    }
}

#[async_trait::async_trait]
impl Adapter for RubiconAdapter {
    fn make_requests(
        &self,
        req: &BidRequest,
        extra: &ExtraRequestInfo,
    ) -> (Vec<RequestData>, Vec<AdapterError>) {
        self.0.make_requests(req, extra)
    }

    fn make_bids(
        &self,
        req: &BidRequest,
        response: &ResponseData,
    ) -> (Option<crate::core::adapter::BidderResponse>, Vec<AdapterError>) {
        self.0.make_bids(req, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_basic_auth() {
        let config = default_config();
        assert_eq!(config.endpoint.auth.auth_type, AuthType::Basic);
    }
}
