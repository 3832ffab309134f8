//! OpenRTB §5.24 no-bid reason codes, plus a small extension range for
//! reasons internal to this exchange (debug/telemetry only — never sent
//! downstream, used to annotate `DebugInfo`).

/// Unknown error.
pub const UNKNOWN_ERROR: i32 = 0;
/// Technical error.
pub const TECHNICAL_ERROR: i32 = 1;
/// Invalid request.
pub const INVALID_REQUEST: i32 = 2;
/// Known web spider.
pub const KNOWN_WEB_SPIDER: i32 = 3;
/// Suspected non-human traffic.
pub const SUSPECTED_NON_HUMAN_TRAFFIC: i32 = 4;
/// Cloud, data center, or proxy IP.
pub const CLOUD_DATACENTER_PROXY_IP: i32 = 5;
/// Unsupported device.
pub const UNSUPPORTED_DEVICE: i32 = 6;
/// Blocked publisher or site.
pub const BLOCKED_PUBLISHER_OR_SITE: i32 = 7;
/// Unmatched user.
pub const UNMATCHED_USER: i32 = 8;
/// Daily reader cap met.
pub const DAILY_READER_CAP_MET: i32 = 9;
/// Daily domain cap met.
pub const DAILY_DOMAIN_CAP_MET: i32 = 10;
/// Ads.txt authorization unavailable / privacy gate rejection.
pub const ADS_TXT_OR_PRIVACY: i32 = 11;

/// Exchange-internal extension range (> 500), never part of the OpenRTB spec.
pub const THROTTLED_BUYER_QPS: i32 = 500;
pub const TIMED_OUT: i32 = 501;
pub const NO_BIDDERS_MATCHED: i32 = 502;
