//! The privacy gate: COPPA, GDPR/TCFv2, CCPA enforcement
//! run against an already-parsed `BidRequest`, before the auction handler
//! hands it to the orchestrator. `core::privacy::tcf` implements the TCFv2
//! bit layout directly since no crate in this dependency set parses it.

use crate::app::config::PrivacyConfig;
use crate::app::errors::PrivacyRejection;
use crate::core::openrtb::BidRequest;
use crate::core::privacy::tcf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
}

/// Runs every enabled check in spec order (COPPA, GDPR, CCPA) and returns
/// the first rejection, or `Allow` if the request clears all of them.
pub fn evaluate(req: &BidRequest, config: &PrivacyConfig) -> Result<Verdict, PrivacyRejection> {
    let regs = req.regs.as_ref();

    if config.enforce_coppa && regs.and_then(|r| r.coppa).unwrap_or(0) == 1 {
        return Err(PrivacyRejection::new("COPPA", "regs.coppa=1"));
    }

    if config.enforce_gdpr {
        let gdpr_applies = regs.and_then(|r| r.gdpr).unwrap_or(0) == 1;
        if gdpr_applies {
            let consent = req.user.as_ref().and_then(|u| u.consent.as_deref());
            let consent = match consent {
                Some(c) if !c.is_empty() => c,
                _ => return Err(PrivacyRejection::new("GDPR", "missing consent string")),
            };

            match tcf::parse(consent) {
                Ok(data) => {
                    if config.strict_mode {
                        let missing = config
                            .required_purposes
                            .iter()
                            .find(|p| !data.purpose_allowed(**p));
                        if let Some(purpose) = missing {
                            return Err(PrivacyRejection::new(
                                "GDPR",
                                format!("strict mode: purpose {purpose} not consented"),
                            ));
                        }
                    }
                }
                Err(e) => {
                    return Err(PrivacyRejection::new(
                        "GDPR",
                        format!("malformed consent string: {e:?}"),
                    ));
                }
            }
        }
    }

    if config.enforce_ccpa {
        if let Some(us_privacy) = regs.and_then(|r| r.us_privacy.as_deref()) {
            if us_privacy.len() >= 4 {
                let bytes = us_privacy.as_bytes();
                if bytes[0] == b'1' {
                    if bytes[2] == b'Y' {
                        return Err(PrivacyRejection::new("CCPA", "opted out (us_privacy)"));
                    }
                    if bytes[1] == b'N' {
                        tracing::info!(us_privacy, "ccpa notice not given, logged not rejected");
                    }
                }
            }
        }
    }

    Ok(Verdict::Allow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::openrtb::{Regs, User};

    fn config() -> PrivacyConfig {
        PrivacyConfig {
            enforce_gdpr: true,
            enforce_coppa: true,
            enforce_ccpa: true,
            strict_mode: false,
            required_purposes: vec![1, 2, 7],
        }
    }

    #[test]
    fn coppa_rejects_when_flagged() {
        let req = BidRequest {
            regs: Some(Regs {
                coppa: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = evaluate(&req, &config()).unwrap_err();
        assert_eq!(err.regulation, "COPPA");
    }

    #[test]
    fn gdpr_rejects_missing_consent() {
        let req = BidRequest {
            regs: Some(Regs {
                gdpr: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = evaluate(&req, &config()).unwrap_err();
        assert_eq!(err.regulation, "GDPR");
    }

    #[test]
    fn gdpr_allows_when_not_applicable() {
        let req = BidRequest {
            regs: Some(Regs {
                gdpr: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(evaluate(&req, &config()).unwrap(), Verdict::Allow);
    }

    #[test]
    fn ccpa_rejects_opt_out() {
        let req = BidRequest {
            regs: Some(Regs {
                us_privacy: Some("1YYN".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = evaluate(&req, &config()).unwrap_err();
        assert_eq!(err.regulation, "CCPA");
    }

    #[test]
    fn ccpa_allows_when_enforcement_disabled() {
        let req = BidRequest {
            regs: Some(Regs {
                us_privacy: Some("1YYN".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut cfg = config();
        cfg.enforce_ccpa = false;
        assert_eq!(evaluate(&req, &cfg).unwrap(), Verdict::Allow);
    }

    #[test]
    fn gdpr_allows_consent_present_outside_strict_mode() {
        // version(2) + zero prefix + all-false purposes, still accepted
        // because strict_mode is off.
        let req = BidRequest {
            regs: Some(Regs {
                gdpr: Some(1),
                ..Default::default()
            }),
            user: Some(User {
                consent: Some(minimal_v2_consent()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(evaluate(&req, &config()).unwrap(), Verdict::Allow);
    }

    fn minimal_v2_consent() -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let total_bits = 6 + 146 + 24;
        let total_bytes = total_bits.div_ceil(8).max(15);
        let mut buf = vec![0u8; total_bytes];
        // version = 2 in the top 6 bits of the first byte.
        buf[0] = 2 << 2;
        URL_SAFE_NO_PAD.encode(buf)
    }
}
