//! TCFv2 consent-string parsing.

use super::bitreader::BitReader;
use crate::core::models::privacy::TCFv2Data;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD as BASE64_STANDARD, URL_SAFE_NO_PAD};

pub const MIN_DECODED_LEN: usize = 15;

/// Bits consumed between the version field and the purpose-consents field
/// in a v2 string: created(36) + lastUpdated(36) + cmpId(12) +
/// cmpVersion(12) + consentScreen(6) + consentLanguage(12) +
/// vendorListVersion(12) + tcfPolicyVersion(6) + isServiceSpecific(1) +
/// useNonStandardStacks(1) + specialFeatureOptIns(12).
const V2_PREFIX_BITS: usize = 36 + 36 + 12 + 12 + 6 + 12 + 12 + 6 + 1 + 1 + 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcfParseError {
    Malformed,
    TooShort,
    UnsupportedVersion(u64),
}

fn decode(raw: &str) -> Result<Vec<u8>, TcfParseError> {
    URL_SAFE_NO_PAD
        .decode(raw.as_bytes())
        .or_else(|_| BASE64_STANDARD.decode(raw.as_bytes()))
        .map_err(|_| TcfParseError::Malformed)
}

pub fn parse(raw: &str) -> Result<TCFv2Data, TcfParseError> {
    let bytes = decode(raw)?;
    if bytes.len() < MIN_DECODED_LEN {
        return Err(TcfParseError::TooShort);
    }

    let mut reader = BitReader::new(&bytes);
    let version = reader.read_uint(6).ok_or(TcfParseError::Malformed)?;

    match version {
        1 => {
            // Version 1 uses an entirely different bit layout; treated as
            // coarsely valid (logged elsewhere, all purposes assumed
            // consented) rather than rejected outright.
            Ok(TCFv2Data {
                version: 1,
                purpose_consents: [true; 24],
            })
        }
        2 => {
            reader.skip(V2_PREFIX_BITS).ok_or(TcfParseError::Malformed)?;
            let mut purpose_consents = [false; 24];
            for slot in &mut purpose_consents {
                *slot = reader.read_bool().ok_or(TcfParseError::Malformed)?;
            }
            Ok(TCFv2Data {
                version: 2,
                purpose_consents,
            })
        }
        other => Err(TcfParseError::UnsupportedVersion(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_v2_with_purposes(purposes: &[u8]) -> String {
        // version(6) + V2_PREFIX_BITS zero bits + 24 purpose bits, padded
        // to a whole byte.
        let total_bits = 6 + V2_PREFIX_BITS + 24;
        let total_bytes = total_bits.div_ceil(8);
        let mut buf = vec![0u8; total_bytes.max(MIN_DECODED_LEN)];

        let mut bit_pos = 0usize;
        let mut set_bits = |value: u64, n: usize, buf: &mut [u8], pos: &mut usize| {
            for i in (0..n).rev() {
                let bit = ((value >> i) & 1) as u8;
                if bit == 1 {
                    buf[*pos / 8] |= 1 << (7 - (*pos % 8));
                }
                *pos += 1;
            }
        };
        set_bits(2, 6, &mut buf, &mut bit_pos);
        bit_pos += V2_PREFIX_BITS;
        for p in 1..=24u8 {
            let consented = purposes.contains(&p);
            set_bits(consented as u64, 1, &mut buf, &mut bit_pos);
        }

        URL_SAFE_NO_PAD.encode(buf)
    }

    #[test]
    fn rejects_too_short_string() {
        let short = URL_SAFE_NO_PAD.encode([0u8; 5]);
        assert_eq!(parse(&short), Err(TcfParseError::TooShort));
    }

    #[test]
    fn rejects_malformed_base64() {
        assert_eq!(parse("not base64 !!"), Err(TcfParseError::Malformed));
    }

    #[test]
    fn parses_purpose_consents_from_v2_string() {
        let encoded = encode_v2_with_purposes(&[1, 2, 7]);
        let data = parse(&encoded).unwrap();
        assert_eq!(data.version, 2);
        assert!(data.purpose_allowed(1));
        assert!(data.purpose_allowed(2));
        assert!(data.purpose_allowed(7));
        assert!(!data.purpose_allowed(3));
    }
}
