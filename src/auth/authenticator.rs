//! Authenticator implementation
//!
//! Applies the configured credentials to outgoing requests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Authentication configuration
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication
    #[default]
    None,

    /// HTTP Basic authentication with an API key/secret pair
    Basic {
        /// API key (user name)
        key: String,
        /// API secret (password)
        secret: String,
    },
}

impl AuthConfig {
    /// Basic auth from a key/secret pair
    pub fn basic(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::Basic {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

// Keep the secret out of debug output and logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Basic { key, .. } => f
                .debug_struct("Basic")
                .field("key", key)
                .field("secret", &"***")
                .finish(),
        }
    }
}

/// Authenticator handles applying authentication to HTTP requests
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    config: AuthConfig,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// The configured credentials
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Value of the `Authorization` header, if any
    pub fn authorization_header(&self) -> Option<String> {
        match &self.config {
            AuthConfig::None => None,
            AuthConfig::Basic { key, secret } => {
                let encoded = STANDARD.encode(format!("{key}:{secret}"));
                Some(format!("Basic {encoded}"))
            }
        }
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self.authorization_header() {
            Some(value) => req.header(AUTHORIZATION, value),
            None => req,
        }
    }
}
