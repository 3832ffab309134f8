//! Publisher auth model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Publisher {
    pub id: String,
    /// `*` (any), or `|`-separated domains, each optionally starting with
    /// `*.` for wildcard subdomain membership.
    pub domains: Vec<String>,
    #[serde(default)]
    pub rate_limit_qps: u32,
    #[serde(default)]
    pub rate_limit_burst: u32,
}

impl Publisher {
    pub fn parse_domain_list(raw: &str) -> Vec<String> {
        raw.split('|')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn allows_domain(&self, domain: &str) -> bool {
        let domain = domain.to_ascii_lowercase();
        self.domains.iter().any(|pattern| {
            if pattern == "*" {
                true
            } else if let Some(suffix) = pattern.strip_prefix("*.") {
                domain == suffix.to_ascii_lowercase()
                    || domain.ends_with(&format!(".{}", suffix.to_ascii_lowercase()))
            } else {
                domain == pattern.to_ascii_lowercase()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_any_matches_everything() {
        let p = Publisher {
            domains: vec!["*".into()],
            ..Default::default()
        };
        assert!(p.allows_domain("example.com"));
    }

    #[test]
    fn wildcard_suffix_matches_subdomains_and_root() {
        let p = Publisher {
            domains: vec!["*.example.com".into()],
            ..Default::default()
        };
        assert!(p.allows_domain("www.example.com"));
        assert!(p.allows_domain("example.com"));
        assert!(!p.allows_domain("evil.com"));
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let p = Publisher {
            domains: vec!["Example.com".into()],
            ..Default::default()
        };
        assert!(p.allows_domain("example.COM"));
    }

    #[test]
    fn parse_domain_list_splits_and_trims() {
        let domains = Publisher::parse_domain_list(" a.com | *.b.com |");
        assert_eq!(domains, vec!["a.com", "*.b.com"]);
    }
}
