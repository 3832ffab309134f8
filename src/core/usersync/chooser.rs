//! `ChooseBidders`: ranks, filters, and caps the candidate
//! bidders for a cookie-sync request.

use crate::core::models::pbs_cookie::PBSCookie;
use crate::core::models::syncer::{SyncType, SyncerConfig};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoSyncerConfig,
    AlreadySynced,
    GdprDenied,
    FilterSettingsExcluded,
    OverCap,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::NoSyncerConfig => "no syncer config",
            RejectReason::AlreadySynced => "already has a live uid",
            RejectReason::GdprDenied => "gdpr enforcement denied",
            RejectReason::FilterSettingsExcluded => "filter settings exclude sync type",
            RejectReason::OverCap => "accepted list already at the request/config limit",
        };
        write!(f, "{s}")
    }
}

pub struct ChooseBidders;

/// Everything the chooser needs to evaluate one candidate, gathered so the
/// function signature stays a plain set of closures rather than a trait
/// object per call site.
pub struct ChooseBiddersInput<'a> {
    pub requested: &'a [String],
    pub cooperative: bool,
    pub all_syncer_keys: &'a [String],
    pub syncers: &'a HashMap<String, SyncerConfig>,
    pub cookie: &'a PBSCookie,
    pub now: i64,
    pub sync_type_preference: &'a [SyncType],
    pub gdpr_applies: bool,
    pub limit: i32,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl ChooseBidders {
    pub fn choose(
        input: &ChooseBiddersInput,
        gdpr_allows: impl Fn(&str) -> bool,
        filter_allows: impl Fn(&str, SyncType) -> bool,
    ) -> (Vec<String>, HashMap<String, RejectReason>) {
        let mut candidates: Vec<String> = input.requested.to_vec();
        if input.cooperative {
            for key in input.all_syncer_keys {
                if !candidates.contains(key) {
                    candidates.push(key.clone());
                }
            }
        }

        let cap = if input.limit > 0 {
            (input.limit as usize).min(input.max_limit)
        } else {
            input.default_limit.min(input.max_limit)
        };

        let mut accepted = Vec::new();
        let mut rejected = HashMap::new();

        for key in candidates {
            let syncer = match input.syncers.get(&key) {
                Some(syncer) => syncer,
                None => {
                    rejected.insert(key, RejectReason::NoSyncerConfig);
                    continue;
                }
            };

            if input.cookie.has_live_uid(&syncer.key, input.now) {
                rejected.insert(key, RejectReason::AlreadySynced);
                continue;
            }

            if input.gdpr_applies && !gdpr_allows(&key) {
                rejected.insert(key, RejectReason::GdprDenied);
                continue;
            }

            let chosen_type = syncer.choose_type(input.sync_type_preference);
            if !filter_allows(&key, chosen_type) {
                rejected.insert(key, RejectReason::FilterSettingsExcluded);
                continue;
            }

            if accepted.len() >= cap {
                rejected.insert(key, RejectReason::OverCap);
                continue;
            }
            accepted.push(key);
        }

        (accepted, rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn syncer(key: &str) -> SyncerConfig {
        SyncerConfig {
            key: key.into(),
            supports: HashSet::from([SyncType::Redirect]),
            default: SyncType::Redirect,
            iframe_url: None,
            redirect_url: Some("https://sync.example/redirect".into()),
            support_cors: true,
            user_macro: "{{redirect_url}}".into(),
        }
    }

    #[test]
    fn rejects_bidder_with_no_syncer_config() {
        let cookie = PBSCookie::new();
        let input = ChooseBiddersInput {
            requested: &["unknown".to_string()],
            cooperative: false,
            all_syncer_keys: &[],
            syncers: &HashMap::new(),
            cookie: &cookie,
            now: 1_000_000,
            sync_type_preference: &[SyncType::Redirect],
            gdpr_applies: false,
            limit: 0,
            default_limit: 5,
            max_limit: 5,
        };
        let (accepted, rejected) = ChooseBidders::choose(&input, |_| true, |_, _| true);
        assert!(accepted.is_empty());
        assert_eq!(rejected.get("unknown"), Some(&RejectReason::NoSyncerConfig));
    }

    #[test]
    fn rejects_already_synced_bidder() {
        let mut cookie = PBSCookie::new();
        cookie.set_uid("adnxs", "u1".into(), None);
        let mut syncers = HashMap::new();
        syncers.insert("adnxs".to_string(), syncer("adnxs"));
        let input = ChooseBiddersInput {
            requested: &["adnxs".to_string()],
            cooperative: false,
            all_syncer_keys: &[],
            syncers: &syncers,
            cookie: &cookie,
            now: 1_000_000,
            sync_type_preference: &[SyncType::Redirect],
            gdpr_applies: false,
            limit: 0,
            default_limit: 5,
            max_limit: 5,
        };
        let (accepted, rejected) = ChooseBidders::choose(&input, |_| true, |_, _| true);
        assert!(accepted.is_empty());
        assert_eq!(rejected.get("adnxs"), Some(&RejectReason::AlreadySynced));
    }

    #[test]
    fn caps_accepted_list_at_default_limit() {
        let mut syncers = HashMap::new();
        for key in ["a", "b", "c"] {
            syncers.insert(key.to_string(), syncer(key));
        }
        let cookie = PBSCookie::new();
        let requested: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let input = ChooseBiddersInput {
            requested: &requested,
            cooperative: false,
            all_syncer_keys: &[],
            syncers: &syncers,
            cookie: &cookie,
            now: 1_000_000,
            sync_type_preference: &[SyncType::Redirect],
            gdpr_applies: false,
            limit: 0,
            default_limit: 2,
            max_limit: 5,
        };
        let (accepted, _) = ChooseBidders::choose(&input, |_| true, |_, _| true);
        assert_eq!(accepted.len(), 2);
    }

    #[test]
    fn over_cap_candidates_land_in_rejected_not_dropped() {
        let mut syncers = HashMap::new();
        for key in ["a", "b", "c"] {
            syncers.insert(key.to_string(), syncer(key));
        }
        let cookie = PBSCookie::new();
        let requested: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let input = ChooseBiddersInput {
            requested: &requested,
            cooperative: false,
            all_syncer_keys: &[],
            syncers: &syncers,
            cookie: &cookie,
            now: 1_000_000,
            sync_type_preference: &[SyncType::Redirect],
            gdpr_applies: false,
            limit: 0,
            default_limit: 2,
            max_limit: 5,
        };
        let (accepted, rejected) = ChooseBidders::choose(&input, |_| true, |_, _| true);
        assert_eq!(accepted.len(), 2);
        // every candidate appears in exactly one of the two outputs
        assert_eq!(accepted.len() + rejected.len(), requested.len());
        assert_eq!(rejected.get("c"), Some(&RejectReason::OverCap));
    }
}
