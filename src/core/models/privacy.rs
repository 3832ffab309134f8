//! `PrivacyInfo` / `TCFv2Data` carriers threaded through the privacy gate,
//! user-sync chooser and syncer macro substitution.

#[derive(Debug, Clone, Default)]
pub struct PrivacyInfo {
    pub gdpr_applies: bool,
    pub gdpr_consent: Option<String>,
    pub us_privacy: Option<String>,
    pub gpp: Option<String>,
    pub gpp_sid: Vec<i32>,
}

impl PrivacyInfo {
    pub fn from_request(req: &crate::core::openrtb::BidRequest) -> Self {
        let regs = req.regs.as_ref();
        Self {
            gdpr_applies: regs.and_then(|r| r.gdpr).unwrap_or(0) == 1,
            gdpr_consent: req.user.as_ref().and_then(|u| u.consent.clone()),
            us_privacy: regs.and_then(|r| r.us_privacy.clone()),
            gpp: regs.and_then(|r| r.gpp.clone()),
            gpp_sid: regs.map(|r| r.gpp_sid.clone()).unwrap_or_default(),
        }
    }
}

/// Parsed TCFv2 consent string.
#[derive(Debug, Clone)]
pub struct TCFv2Data {
    pub version: u8,
    /// Index 0 == purpose 1 ... index 23 == purpose 24.
    pub purpose_consents: [bool; 24],
}

impl TCFv2Data {
    pub fn purpose_allowed(&self, purpose: u8) -> bool {
        if purpose == 0 || purpose > 24 {
            return false;
        }
        self.purpose_consents[(purpose - 1) as usize]
    }
}
