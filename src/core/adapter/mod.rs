//! The bidder adapter contract: every adapter exposes
//! exactly two operations, `make_requests` and `make_bids`.

pub mod adapters;
pub mod generic;

use crate::core::openrtb::{Bid, BidRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidType {
    Banner,
    Video,
    Native,
    Audio,
}

#[derive(Debug, Clone, Default)]
pub struct BidVideo {
    pub duration: Option<i32>,
    pub primary_category: Option<String>,
}

/// A bid tagged with its inferred media type.
#[derive(Debug, Clone)]
pub struct TypedBid {
    pub bid: Bid,
    pub bid_type: BidType,
    pub video: Option<BidVideo>,
}

#[derive(Debug, Clone, Default)]
pub struct BidderResponse {
    pub seat: String,
    pub bids: Vec<TypedBid>,
    /// Response currency, default "USD" if absent.
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: HttpMethod,
    pub uri: String,
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status_code: u16,
    pub body: Vec<u8>,
}

/// Per-call context passed to `make_requests` beyond the bid request
/// itself — extension point for things like an already-resolved
/// publisher-level macro table. Kept intentionally small and opaque.
#[derive(Debug, Clone, Default)]
pub struct ExtraRequestInfo {
    pub publisher_id: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AdapterError {
    /// Accompanies, never replaces, successful requests.
    BadInput(String),
    ProtocolError(String),
    ServerError(String),
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterError::BadInput(m) => write!(f, "bad input: {m}"),
            AdapterError::ProtocolError(m) => write!(f, "protocol error: {m}"),
            AdapterError::ServerError(m) => write!(f, "server error: {m}"),
        }
    }
}
impl std::error::Error for AdapterError {}

/// Unified bidder adapter contract.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// May return zero, one, or many outbound HTTP requests.
    fn make_requests(
        &self,
        req: &BidRequest,
        extra: &ExtraRequestInfo,
    ) -> (Vec<RequestData>, Vec<AdapterError>);

    /// HTTP 204 -> `Ok(None)` (no bid, not an error). HTTP 400 -> a protocol
    /// error. Any other non-2xx -> a server error. On 200, parse the body.
    fn make_bids(
        &self,
        req: &BidRequest,
        response: &ResponseData,
    ) -> (Option<BidderResponse>, Vec<AdapterError>);
}

/// Infers a bid's media type by matching `impid` against the originating
/// impression's populated media objects — first non-nil wins, default
/// banner.
pub fn infer_bid_type(req: &BidRequest, impid: &str) -> BidType {
    let imp = req.imp.iter().find(|i| i.id == impid);
    match imp {
        Some(imp) => {
            if imp.banner.is_some() {
                BidType::Banner
            } else if imp.video.is_some() {
                BidType::Video
            } else if imp.native.is_some() {
                BidType::Native
            } else if imp.audio.is_some() {
                BidType::Audio
            } else {
                BidType::Banner
            }
        }
        None => BidType::Banner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::openrtb::{Banner, Imp, Video};

    fn req_with(imps: Vec<Imp>) -> BidRequest {
        BidRequest {
            id: "r1".into(),
            imp: imps,
            ..Default::default()
        }
    }

    #[test]
    fn infers_banner_by_default() {
        let req = req_with(vec![Imp {
            id: "i1".into(),
            ..Default::default()
        }]);
        assert_eq!(infer_bid_type(&req, "i1"), BidType::Banner);
    }

    #[test]
    fn infers_video_over_nothing_when_set() {
        let req = req_with(vec![Imp {
            id: "i1".into(),
            video: Some(Video::default()),
            ..Default::default()
        }]);
        assert_eq!(infer_bid_type(&req, "i1"), BidType::Video);
    }

    #[test]
    fn banner_wins_when_first_populated() {
        let req = req_with(vec![Imp {
            id: "i1".into(),
            banner: Some(Banner::default()),
            video: Some(Video::default()),
            ..Default::default()
        }]);
        assert_eq!(infer_bid_type(&req, "i1"), BidType::Banner);
    }

    #[test]
    fn unknown_impid_defaults_to_banner() {
        let req = req_with(vec![]);
        assert_eq!(infer_bid_type(&req, "missing"), BidType::Banner);
    }
}
