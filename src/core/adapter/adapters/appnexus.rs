//! AppNexus wraps the generic configurable adapter with its own defaults;
//! bidder-specific logic beyond endpoint shape is intentionally absent.

use crate::core::adapter::generic::GenericConfigurableAdapter;
use crate::core::adapter::{Adapter, AdapterError, ExtraRequestInfo, RequestData, ResponseData};
use crate::core::models::bidder_config::{BidderConfig, BidderStatus, Endpoint, HttpMethod};
use crate::core::openrtb::BidRequest;

pub const BIDDER_CODE: &str = "appnexus";

pub fn default_config() -> BidderConfig {
    BidderConfig {
        bidder_code: BIDDER_CODE.into(),
        endpoint: Endpoint {
            url: "https://ib.adnxs.com/openrtb2".into(),
            method: HttpMethod::Post,
            protocol_version: "2.5".into(),
            ..Default::default()
        },
        status: BidderStatus::Active,
        ..Default::default()
    }
}

pub struct AppnexusAdapter(GenericConfigurableAdapter);

impl AppnexusAdapter {
    pub fn new(config: BidderConfig) -> Self {
        Self(GenericConfigurableAdapter::new(config))
    }
}

#[async_trait::async_trait]
impl Adapter for AppnexusAdapter {
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
    fn default_config_is_active_and_post() {
        let config = default_config();
        assert_eq!(config.bidder_code, BIDDER_CODE);
        assert_eq!(config.status, BidderStatus::Active);
        assert_eq!(config.endpoint.method, HttpMethod::Post);
    }
}
