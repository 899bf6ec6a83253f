//! Client configuration
//!
//! [`VaultConfig`] holds the station, credentials and HTTP settings needed
//! to build a [`MembershipVault`](crate::membership::MembershipVault). It can
//! be loaded from YAML or from `MVAULT_*` environment variables.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Production API root
pub const DEFAULT_BASE_URI: &str = "https://mvault.services.pbs.org/api";

/// Staging API root
pub const STAGING_BASE_URI: &str = "https://mvault-staging.services.pbs.org/api";

/// Environment variable names read by [`VaultConfig::from_env`]
pub const ENV_BASE_URI: &str = "MVAULT_BASE_URI";
pub const ENV_STATION_ID: &str = "MVAULT_STATION_ID";
pub const ENV_KEY: &str = "MVAULT_KEY";
pub const ENV_SECRET: &str = "MVAULT_SECRET";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Everything needed to talk to one station's vault
#[derive(Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// API root, without the station segment
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    /// Station call sign, e.g. "wxxx"
    pub station_id: String,

    /// API key
    pub key: String,

    /// API secret
    pub secret: String,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpSettings,
}

fn default_base_uri() -> String {
    DEFAULT_BASE_URI.to_string()
}

impl VaultConfig {
    /// Config for the production API
    pub fn new(
        station_id: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_uri: default_base_uri(),
            station_id: station_id.into(),
            key: key.into(),
            secret: secret.into(),
            http: HttpSettings::default(),
        }
    }

    /// Point at a different API root
    #[must_use]
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    /// Replace the HTTP settings
    #[must_use]
    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Build from `MVAULT_*` environment variables.
    ///
    /// `MVAULT_BASE_URI` is optional; the other three are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::missing_field(name))
        };

        let mut config = Self::new(
            required(ENV_STATION_ID)?,
            required(ENV_KEY)?,
            required(ENV_SECRET)?,
        );
        if let Some(base_uri) = lookup(ENV_BASE_URI).filter(|v| !v.is_empty()) {
            config.base_uri = base_uri;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and the base URI
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("station_id", &self.station_id),
            ("key", &self.key),
            ("secret", &self.secret),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        let url = Url::parse(&self.base_uri)?;
        if url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base_uri cannot be used as a base: {}",
                self.base_uri
            )));
        }
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_uri must be http or https: {}",
                self.base_uri
            )));
        }
        Ok(())
    }

    /// Basic credentials for the API
    pub fn auth(&self) -> AuthConfig {
        AuthConfig::basic(&self.key, &self.secret)
    }

    /// Transport settings.
    ///
    /// Status handling is left to the caller so 404 and 4xx bodies reach
    /// the classifier.
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.backoff,
                Duration::from_millis(self.http.initial_backoff_ms),
                Duration::from_millis(self.http.max_backoff_ms),
            )
            .error_for_status(false);
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("base_uri", &self.base_uri)
            .field("station_id", &self.station_id)
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .field("http", &self.http)
            .finish()
    }
}

// ============================================================================
// HTTP Settings
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay
    #[serde(default = "default_initial_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling
    #[serde(default = "default_max_ms")]
    pub max_backoff_ms: u64,

    #[serde(default)]
    pub backoff: BackoffType,

    /// Overrides the default user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_ms(),
            max_backoff_ms: default_max_ms(),
            backoff: BackoffType::default(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_ms() -> u64 {
    500
}

fn default_max_ms() -> u64 {
    30_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
station_id: wxxx
key: abc
secret: shh
"#;

        let config = VaultConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.base_uri, DEFAULT_BASE_URI);
        assert_eq!(config.station_id, "wxxx");
        assert_eq!(config.http, HttpSettings::default());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
base_uri: "https://mvault-staging.services.pbs.org/api"
station_id: wxxx
key: abc
secret: shh
http:
  timeout_seconds: 5
  max_retries: 0
  backoff: constant
  user_agent: "station-sync/2.0"
"#;

        let config = VaultConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.base_uri, STAGING_BASE_URI);
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.http.backoff, BackoffType::Constant);
        assert_eq!(config.http.initial_backoff_ms, 500);

        let http = config.http_client_config();
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.user_agent, "station-sync/2.0");
        assert!(!http.error_for_status);
    }

    #[test]
    fn test_missing_required_field() {
        let yaml = r#"
station_id: wxxx
key: abc
secret: ""
"#;

        let err = VaultConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "secret"));
    }

    #[test]
    fn test_invalid_base_uri() {
        let config = VaultConfig::new("wxxx", "k", "s").with_base_uri("not a url");
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        let config = VaultConfig::new("wxxx", "k", "s").with_base_uri("ftp://example.org/api");
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "station_id: wxxx\nkey: abc\nsecret: shh").unwrap();

        let config = VaultConfig::from_file(file.path()).unwrap();
        assert_eq!(config.key, "abc");

        let err = VaultConfig::from_file("/nonexistent/mvault.yaml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_STATION_ID, "wxxx"),
            (ENV_KEY, "abc"),
            (ENV_SECRET, "shh"),
            (ENV_BASE_URI, STAGING_BASE_URI),
        ]
        .into_iter()
        .collect();

        let config = VaultConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.station_id, "wxxx");
        assert_eq!(config.base_uri, STAGING_BASE_URI);

        let err = VaultConfig::from_lookup(|name| {
            (name != ENV_KEY)
                .then(|| vars.get(name).map(|v| v.to_string()))
                .flatten()
        })
        .unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == ENV_KEY));
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = VaultConfig::new("wxxx", "abc", "topsecret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("wxxx"));
    }
}
