//! Builds a bidder's outbound sync URL from its [`SyncerConfig`] template.

use crate::core::models::privacy::PrivacyInfo;
use crate::core::models::syncer::{SyncType, SyncerConfig};
use url::form_urlencoded::byte_serialize;

/// Conventional placeholder a bidder's own redirect-back URL uses for the
/// UID it is handing us; every syncer is expected to honour it literally.
pub const REDIRECT_UID_MACRO: &str = "{{uid}}";

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

fn privacy_query(privacy: &PrivacyInfo) -> String {
    let mut params = vec![
        format!("gdpr={}", if privacy.gdpr_applies { "1" } else { "0" }),
        format!(
            "gdpr_consent={}",
            encode(privacy.gdpr_consent.as_deref().unwrap_or(""))
        ),
        format!("us_privacy={}", encode(privacy.us_privacy.as_deref().unwrap_or(""))),
    ];
    if let Some(gpp) = &privacy.gpp {
        params.push(format!("gpp={}", encode(gpp)));
    }
    if !privacy.gpp_sid.is_empty() {
        let sids = privacy
            .gpp_sid
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",");
        params.push(format!("gpp_sid={}", encode(&sids)));
    }
    params.join("&")
}

/// Builds the redirect-back URL pointing at our own `/setuid` endpoint.
fn build_redirect_url(base_url: &str, bidder_code: &str, privacy: &PrivacyInfo) -> String {
    format!(
        "{base}/setuid?bidder={bidder}&uid={uid_macro}&{privacy}",
        base = base_url.trim_end_matches('/'),
        bidder = encode(bidder_code),
        uid_macro = REDIRECT_UID_MACRO,
        privacy = privacy_query(privacy),
    )
}

fn substitute_privacy_macros(template: &str, privacy: &PrivacyInfo) -> String {
    let gpp_sid = privacy
        .gpp_sid
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(",");
    template
        .replace("{{gdpr}}", if privacy.gdpr_applies { "1" } else { "0" })
        .replace(
            "{{gdpr_consent}}",
            &encode(privacy.gdpr_consent.as_deref().unwrap_or("")),
        )
        .replace(
            "{{us_privacy}}",
            &encode(privacy.us_privacy.as_deref().unwrap_or("")),
        )
        .replace("{{gpp}}", &encode(privacy.gpp.as_deref().unwrap_or("")))
        .replace("{{gpp_sid}}", &encode(&gpp_sid))
}

/// Produces the final sync URL for `bidder_code`: picks a sync type from
/// `preference` (falling back to the syncer's default), then substitutes
/// privacy macros and the constructed redirect URL into the chosen
/// template.
pub fn build_sync_url(
    syncer: &SyncerConfig,
    preference: &[SyncType],
    bidder_code: &str,
    our_base_url: &str,
    privacy: &PrivacyInfo,
) -> Option<String> {
    let sync_type = syncer.choose_type(preference);
    let template = syncer.template(sync_type)?;

    let redirect_url = build_redirect_url(our_base_url, bidder_code, privacy);
    let substituted = substitute_privacy_macros(template, privacy);
    Some(substituted.replace(&syncer.user_macro, &encode(&redirect_url)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn syncer() -> SyncerConfig {
        SyncerConfig {
            key: "adnxs".into(),
            supports: HashSet::from([SyncType::Redirect, SyncType::Iframe]),
            default: SyncType::Redirect,
            iframe_url: Some("https://sync.example/iframe?gdpr={{gdpr}}&r={{redirect_url}}".into()),
            redirect_url: Some("https://sync.example/redirect?gdpr={{gdpr}}&r={{redirect_url}}".into()),
            support_cors: true,
            user_macro: "{{redirect_url}}".into(),
        }
    }

    #[test]
    fn builds_url_with_redirect_and_privacy_macros_substituted() {
        let privacy = PrivacyInfo {
            gdpr_applies: true,
            gdpr_consent: Some("CONSENT".into()),
            us_privacy: None,
            gpp: None,
            gpp_sid: vec![],
        };
        let url = build_sync_url(
            &syncer(),
            &[SyncType::Redirect],
            "appnexus",
            "https://nexus.example",
            &privacy,
        )
        .unwrap();
        assert!(url.contains("gdpr=1"));
        assert!(url.contains("setuid%3Fbidder%3Dappnexus") || url.contains("setuid"));
        assert!(!url.contains("{{redirect_url}}"));
    }

    #[test]
    fn falls_back_to_default_when_preference_unsupported() {
        let cfg = syncer();
        assert_eq!(cfg.choose_type(&[]), SyncType::Redirect);
    }

    #[test]
    fn substitutes_gpp_sid_macro() {
        let mut cfg = syncer();
        cfg.redirect_url = Some("https://sync.example/redirect?gpp_sid={{gpp_sid}}&r={{redirect_url}}".into());
        let privacy = PrivacyInfo {
            gdpr_applies: false,
            gdpr_consent: None,
            us_privacy: None,
            gpp: None,
            gpp_sid: vec![2, 6],
        };
        let url = build_sync_url(&cfg, &[SyncType::Redirect], "appnexus", "https://nexus.example", &privacy)
            .unwrap();
        assert!(url.contains("gpp_sid=2%2C6") || url.contains("gpp_sid=2,6"));
        assert!(!url.contains("{{gpp_sid}}"));
    }
}
