//! `NexusConfig` — the single process-wide configuration object, loaded via
//! the `config` crate from a YAML file plus environment-variable overrides.

use crate::core::models::publisher::Publisher;
use crate::core::models::syncer::SyncerConfig;
use config::Config;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[serde(default)]
pub struct ServerConfig {
    pub http_port: u16,
    pub max_tmax_ms: u64,
    /// Base URL this process is reachable at, used to build `/setuid`
    /// redirect URLs in the user-sync subsystem.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtelProto {
    Http,
    Grpc,
}

impl Default for OtelProto {
    fn default() -> Self {
        OtelProto::Grpc
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    Daily,
    Hourly,
    Never,
}

impl Default for FileRotation {
    fn default() -> Self {
        FileRotation::Daily
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSink {
    pub spans: bool,
    pub dest: LogType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogType {
    Stdout {
        #[serde(default = "default_logtype_color")]
        color: bool,
        #[serde(default)]
        json: bool,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        json: bool,
        #[serde(default)]
        rotation: FileRotation,
        #[serde(default)]
        max_files: usize,
    },
    Otel {
        endpoint: String,
        #[serde(default)]
        proto: OtelProto,
    },
}

fn default_logtype_color() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub span_sample_rate: f32,
    #[serde(default)]
    pub sinks: Vec<LogSink>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            span_sample_rate: 0.01,
            sinks: vec![LogSink {
                spans: true,
                dest: LogType::Stdout {
                    color: true,
                    json: false,
                },
            }],
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.sinks.is_empty() {
            anyhow::bail!("At least one logging sink must be configured");
        }
        self.level.parse::<tracing::Level>().map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: trace, debug, info, warn, error",
                self.level
            )
        })?;
        if !(0.0..=1.0).contains(&self.span_sample_rate) {
            anyhow::bail!(
                "span_sample_rate must be between 0.0 and 1.0, got {}",
                self.span_sample_rate
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Exact origins, `*`, or `*.suffix`.
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecurityHeadersConfig {
    pub enabled: bool,
    pub hsts: bool,
    pub csp: Option<String>,
    pub permissions_policy: Option<String>,
    /// Paths exempt from the no-store `Cache-Control`.
    pub cacheable_paths: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub use_redis: bool,
    /// Header name the API key is read from when not using `Authorization:
    /// Bearer`.
    pub header_name: String,
    /// `api_key -> publisher_id`, the local fallback behind the remote
    /// `nexus:api_keys` hash.
    pub api_keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PublisherAuthConfig {
    pub enabled: bool,
    pub allow_unregistered: bool,
    pub validate_domain: bool,
    pub registered_publishers: Vec<Publisher>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub rps: u32,
    pub burst: u32,
    pub idle_sweep_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rps: 50,
            burst: 100,
            idle_sweep_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SizeLimitConfig {
    pub max_body_bytes: usize,
    pub max_url_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    pub enforce_gdpr: bool,
    pub enforce_coppa: bool,
    pub enforce_ccpa: bool,
    pub strict_mode: bool,
    /// Purposes that must all be consented-to under strict mode.
    pub required_purposes: Vec<u8>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            enforce_gdpr: true,
            enforce_coppa: true,
            enforce_ccpa: true,
            strict_mode: false,
            required_purposes: vec![1, 2, 7],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub bidder_refresh_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IdrConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CookieConfig {
    pub domain: Option<String>,
    pub max_age_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserSyncConfig {
    pub cookie: CookieConfig,
    pub syncers: HashMap<String, SyncerConfig>,
    pub default_limit: usize,
    pub max_limit: usize,
    pub cooperative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[serde(default)]
pub struct NexusConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
    pub security_headers: SecurityHeadersConfig,
    pub auth: AuthConfig,
    pub publisher_auth: PublisherAuthConfig,
    pub rate_limit: RateLimitConfig,
    pub size_limit: SizeLimitConfig,
    pub privacy: PrivacyConfig,
    pub redis: RedisConfig,
    pub idr: IdrConfig,
    pub usersync: UserSyncConfig,
    pub cooperative_sync_auction: bool,
}

impl NexusConfig {
    /// Loads from `path`, then layers `NEXUS_`-prefixed environment
    /// variables on top.
    pub fn load(path: &Path) -> Result<NexusConfig, anyhow::Error> {
        let cfg = Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .add_source(config::Environment::with_prefix("NEXUS").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_config_validate_rejects_bad_level() {
        let mut cfg = LoggingConfig::default();
        cfg.level = "not-a-level".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn logging_config_validate_rejects_empty_sinks() {
        let cfg = LoggingConfig {
            level: "info".into(),
            span_sample_rate: 0.1,
            sinks: Vec::new(),
        };
        assert!(cfg.validate().is_err());
    }
}
