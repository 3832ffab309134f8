//! `PBSCookie` and its base64url(JSON) codec.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UidEntry {
    pub uid: String,
    /// Unix seconds; absent means "no explicit expiry, governed by the
    /// cookie's own Max-Age".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PBSCookie {
    #[serde(default)]
    pub uids: HashMap<String, UidEntry>,
    #[serde(default)]
    pub opt_out: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<i64>,
}

impl PBSCookie {
    pub fn new() -> Self {
        Self {
            birthday: Some(now_unix()),
            ..Default::default()
        }
    }

    /// Entries with `expires < now` are treated as absent.
    pub fn live_uid(&self, syncer_key: &str, now: i64) -> Option<&str> {
        self.uids.get(syncer_key).and_then(|entry| {
            match entry.expires {
                Some(exp) if exp < now => None,
                _ => Some(entry.uid.as_str()),
            }
        })
    }

    pub fn has_live_uid(&self, syncer_key: &str, now: i64) -> bool {
        self.live_uid(syncer_key, now).is_some()
    }

    /// Sets a uid under `syncer_key`. No-op (besides the opt-out check) if
    /// the cookie is opted out — any write that is not itself another
    /// opt-out is dropped.
    pub fn set_uid(&mut self, syncer_key: &str, uid: String, expires: Option<i64>) {
        if self.opt_out {
            return;
        }
        self.uids
            .insert(syncer_key.to_string(), UidEntry { uid, expires });
    }

    pub fn remove_uid(&mut self, syncer_key: &str) {
        self.uids.remove(syncer_key);
    }

    pub fn set_opt_out(&mut self, opt_out: bool) {
        self.opt_out = opt_out;
        if opt_out {
            self.uids.clear();
        }
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decoding never fails outward: malformed base64 or JSON yields an
    /// empty, non-opted-out cookie.
    pub fn decode(raw: &str) -> Self {
        let Ok(bytes) = URL_SAFE_NO_PAD.decode(raw.as_bytes()) else {
            return Self::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }
}

fn now_unix() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_garbage_never_panics_and_is_empty() {
        let cookie = PBSCookie::decode("not valid base64 or json!!");
        assert_eq!(cookie, PBSCookie::default());
    }

    #[test]
    fn roundtrip_preserves_live_entries() {
        let mut cookie = PBSCookie::new();
        cookie.set_uid("adnxs", "u1".into(), None);
        cookie.set_uid("rubicon", "u2".into(), Some(now_unix() + 1000));

        let decoded = PBSCookie::decode(&cookie.encode());
        assert_eq!(decoded.uids, cookie.uids);
        assert_eq!(decoded.birthday, cookie.birthday);
    }

    #[test]
    fn opt_out_clears_uids_and_blocks_future_writes() {
        let mut cookie = PBSCookie::new();
        cookie.set_uid("adnxs", "u1".into(), None);
        cookie.set_opt_out(true);
        assert!(cookie.uids.is_empty());

        cookie.set_uid("rubicon", "u2".into(), None);
        assert!(cookie.uids.is_empty());
    }

    #[test]
    fn expired_entries_are_treated_as_absent() {
        let mut cookie = PBSCookie::new();
        cookie.set_uid("adnxs", "u1".into(), Some(100));
        assert!(!cookie.has_live_uid("adnxs", 200));
        assert!(cookie.has_live_uid("adnxs", 50));
    }
}
