//! The generic configurable adapter: instantiated from a
//! [`BidderConfig`], drives every dynamically-registered bidder and backs
//! the thin concrete adapters under `adapters/`.

use super::{
    Adapter, AdapterError, BidType, BidVideo, BidderResponse, ExtraRequestInfo, HttpMethod,
    RequestData, ResponseData, TypedBid, infer_bid_type,
};
use crate::core::models::bidder_config::{AuthType, BidderConfig};
use crate::core::openrtb::{BidRequest, BidResponse, SChainNode, SupplyChain};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde_json::Value;

/// Deep-merges `patch` onto `target`: the patch's keys overwrite the
/// target's top-level keys; nested objects are merged one level deep;
/// arrays are replaced outright.
pub fn deep_merge_ext(target: &mut Value, patch: &Value) {
    let (Some(target_obj), Some(patch_obj)) = (target.as_object_mut(), patch.as_object()) else {
        *target = patch.clone();
        return;
    };
    for (key, patch_value) in patch_obj {
        match (target_obj.get_mut(key), patch_value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (k, v) in incoming {
                    existing.insert(k.clone(), v.clone());
                }
            }
            _ => {
                target_obj.insert(key.clone(), patch_value.clone());
            }
        }
    }
}

fn ensure_object(value: &mut Option<Value>) -> &mut Value {
    if !matches!(value, Some(Value::Object(_))) {
        *value = Some(Value::Object(Default::default()));
    }
    value.as_mut().unwrap()
}

/// Instantiated per bidder from its [`BidderConfig`] snapshot.
pub struct GenericConfigurableAdapter {
    config: BidderConfig,
}

impl GenericConfigurableAdapter {
    pub fn new(config: BidderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BidderConfig {
        &self.config
    }

    /// Step 2: merge the configured ext templates into the cloned request.
    fn apply_ext_templates(&self, req: &mut BidRequest) {
        let transform = &self.config.request_transform;

        if let Some(template) = &transform.imp_ext_template {
            for imp in &mut req.imp {
                deep_merge_ext(ensure_object(&mut imp.ext), template);
            }
        }
        if let Some(template) = &transform.request_ext_template {
            deep_merge_ext(ensure_object(&mut req.ext), template);
        }
        if let Some(template) = &transform.site_ext_template {
            if let Some(site) = req.site.as_mut() {
                deep_merge_ext(ensure_object(&mut site.ext), template);
            }
        }
        if let Some(template) = &transform.user_ext_template {
            if let Some(user) = req.user.as_mut() {
                deep_merge_ext(ensure_object(&mut user.ext), template);
            }
        }
    }

    /// Step 3: non-destructive SChain augmentation. The caller's `req` is
    /// already our own clone, so mutating it here does not touch the
    /// original request the orchestrator holds.
    fn apply_schain(&self, req: &mut BidRequest) {
        let augment = &self.config.request_transform.schain_augment;
        if !augment.enabled || augment.nodes.is_empty() {
            return;
        }

        let source = req.source.get_or_insert_with(Default::default);
        let schain = source.schain.get_or_insert_with(|| SupplyChain {
            ver: "1.0".into(),
            complete: 1,
            nodes: Vec::new(),
        });

        for node in &augment.nodes {
            schain.nodes.push(SChainNode {
                asi: node.asi.clone(),
                sid: node.sid.clone(),
                hp: node.hp,
                rid: node.rid.clone(),
                name: node.name.clone(),
                domain: node.domain.clone(),
            });
        }

        if let Some(complete) = augment.complete {
            schain.complete = complete;
        }
    }

    /// Step 4: standard headers, auth headers, then per-config overrides.
    fn build_headers(&self) -> std::collections::HashMap<String, String> {
        let mut headers = std::collections::HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/json;charset=utf-8".to_string(),
        );
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert(
            "X-OpenRTB-Version".to_string(),
            self.config.endpoint.protocol_version.clone(),
        );

        let auth = &self.config.endpoint.auth;
        match auth.auth_type {
            AuthType::Basic => {
                let user = auth.username.clone().unwrap_or_default();
                let pass = auth.password.clone().unwrap_or_default();
                let encoded = BASE64_STANDARD.encode(format!("{user}:{pass}"));
                headers.insert("Authorization".to_string(), format!("Basic {encoded}"));
            }
            AuthType::Bearer => {
                if let Some(token) = &auth.token {
                    headers.insert("Authorization".to_string(), format!("Bearer {token}"));
                }
            }
            AuthType::Header => {
                if let (Some(name), Some(value)) = (&auth.header_name, &auth.header_value) {
                    headers.insert(name.clone(), value.clone());
                }
            }
            AuthType::None => {}
        }

        for (key, value) in &self.config.endpoint.custom_headers {
            headers.insert(key.clone(), value.clone());
        }

        headers
    }
}

#[async_trait::async_trait]
impl Adapter for GenericConfigurableAdapter {
    fn make_requests(
        &self,
        req: &BidRequest,
        _extra: &ExtraRequestInfo,
    ) -> (Vec<RequestData>, Vec<AdapterError>) {
        // Step 1: shallow clone of the envelope; sub-objects we mutate are
        // deep-copied naturally by `Clone` since the top-level struct owns
        // them outright (no shared state to worry about here).
        let mut transformed = req.clone();

        self.apply_ext_templates(&mut transformed);
        self.apply_schain(&mut transformed);

        let body = match serde_json::to_vec(&transformed) {
            Ok(body) => body,
            Err(e) => {
                return (
                    Vec::new(),
                    vec![AdapterError::BadInput(format!("failed to serialize request: {e}"))],
                );
            }
        };

        let method = match self.config.endpoint.method {
            crate::core::models::bidder_config::HttpMethod::Get => HttpMethod::Get,
            crate::core::models::bidder_config::HttpMethod::Post => HttpMethod::Post,
        };

        let request = RequestData {
            method,
            uri: self.config.endpoint.url.clone(),
            body,
            headers: self.build_headers(),
        };

        (vec![request], Vec::new())
    }

    fn make_bids(
        &self,
        req: &BidRequest,
        response: &ResponseData,
    ) -> (Option<BidderResponse>, Vec<AdapterError>) {
        if response.status_code == 204 {
            return (None, Vec::new());
        }
        if response.status_code == 400 {
            return (
                None,
                vec![AdapterError::ProtocolError(format!(
                    "{} returned 400",
                    self.config.bidder_code
                ))],
            );
        }
        if !(200..300).contains(&response.status_code) {
            return (
                None,
                vec![AdapterError::ServerError(format!(
                    "{} returned status {}",
                    self.config.bidder_code, response.status_code
                ))],
            );
        }

        let parsed: BidResponse = match serde_json::from_slice(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                return (
                    None,
                    vec![AdapterError::ProtocolError(format!(
                        "failed to parse response body: {e}"
                    ))],
                );
            }
        };

        let adjustment = self.config.response_transform.price_adjustment;
        let apply_adjustment = adjustment != 0.0 && adjustment != 1.0;

        let seat = parsed
            .seatbid
            .first()
            .map(|sb| sb.seat.clone())
            .unwrap_or_else(|| self.config.bidder_code.clone());

        let mut bids = Vec::new();
        for seatbid in &parsed.seatbid {
            for mut bid in seatbid.bid.clone() {
                if apply_adjustment {
                    bid.price *= adjustment;
                }
                let bid_type = infer_bid_type(req, &bid.impid);
                bids.push(TypedBid {
                    bid,
                    bid_type,
                    video: if bid_type == BidType::Video {
                        Some(BidVideo::default())
                    } else {
                        None
                    },
                });
            }
        }

        (
            Some(BidderResponse {
                seat,
                bids,
                currency: parsed.cur,
            }),
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bidder_config::{Endpoint, SchainAugment, SchainNodeConfig};
    use crate::core::openrtb::{Imp, Source};
    use serde_json::json;

    fn base_config() -> BidderConfig {
        BidderConfig {
            bidder_code: "acme".into(),
            endpoint: Endpoint {
                url: "https://acme.example/bid".into(),
                protocol_version: "2.5".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn deep_merge_overwrites_top_level_and_merges_nested_objects() {
        let mut target = json!({"a": 1, "nested": {"x": 1, "y": 2}, "arr": [1,2]});
        let patch = json!({"a": 2, "nested": {"y": 3, "z": 4}, "arr": [9]});
        deep_merge_ext(&mut target, &patch);
        assert_eq!(target["a"], 2);
        assert_eq!(target["nested"]["x"], 1);
        assert_eq!(target["nested"]["y"], 3);
        assert_eq!(target["nested"]["z"], 4);
        assert_eq!(target["arr"], json!([9]));
    }

    #[test]
    fn schain_augmentation_is_non_destructive_to_input() {
        let mut config = base_config();
        config.request_transform.schain_augment = SchainAugment {
            enabled: true,
            nodes: vec![SchainNodeConfig {
                asi: "exchange.com".into(),
                sid: "123".into(),
                hp: 1,
                ..Default::default()
            }],
            complete: None,
        };
        let adapter = GenericConfigurableAdapter::new(config);

        let original_schain = SupplyChain {
            ver: "1.0".into(),
            complete: 1,
            nodes: vec![SChainNode {
                asi: "publisher.com".into(),
                sid: "abc".into(),
                hp: 1,
                ..Default::default()
            }],
        };
        let req = BidRequest {
            id: "r1".into(),
            imp: vec![Imp {
                id: "i1".into(),
                ..Default::default()
            }],
            source: Some(Source {
                schain: Some(original_schain.clone()),
                ext: None,
            }),
            ..Default::default()
        };

        let (requests, errors) = adapter.make_requests(&req, &ExtraRequestInfo::default());
        assert!(errors.is_empty());
        assert_eq!(requests.len(), 1);

        // original untouched
        assert_eq!(req.source.unwrap().schain.unwrap(), original_schain);

        let sent: BidRequest = serde_json::from_slice(&requests[0].body).unwrap();
        let sent_schain = sent.source.unwrap().schain.unwrap();
        assert_eq!(sent_schain.nodes.len(), 2);
        assert_eq!(sent_schain.nodes[1].asi, "exchange.com");
    }

    #[test]
    fn make_bids_treats_204_as_no_bid_not_error() {
        let adapter = GenericConfigurableAdapter::new(base_config());
        let req = BidRequest::default();
        let (resp, errors) = adapter.make_bids(
            &req,
            &ResponseData {
                status_code: 204,
                body: Vec::new(),
            },
        );
        assert!(resp.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn make_bids_treats_400_as_protocol_error() {
        let adapter = GenericConfigurableAdapter::new(base_config());
        let req = BidRequest::default();
        let (resp, errors) = adapter.make_bids(
            &req,
            &ResponseData {
                status_code: 400,
                body: Vec::new(),
            },
        );
        assert!(resp.is_none());
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], AdapterError::ProtocolError(_)));
    }

    #[test]
    fn price_adjustment_skipped_when_one_applied_otherwise() {
        let mut config = base_config();
        config.response_transform.price_adjustment = 0.9;
        let adapter = GenericConfigurableAdapter::new(config);

        let req = BidRequest {
            imp: vec![Imp {
                id: "i1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let body = serde_json::to_vec(&BidResponse {
            id: "r1".into(),
            seatbid: vec![crate::core::openrtb::SeatBid {
                seat: "acme".into(),
                bid: vec![crate::core::openrtb::Bid {
                    id: "b1".into(),
                    impid: "i1".into(),
                    price: 10.0,
                    ..Default::default()
                }],
            }],
            cur: Some("USD".into()),
            ext: None,
        })
        .unwrap();

        let (resp, _) = adapter.make_bids(
            &req,
            &ResponseData {
                status_code: 200,
                body,
            },
        );
        let resp = resp.unwrap();
        assert_eq!(resp.bids[0].bid.price, 9.0);
    }
}
