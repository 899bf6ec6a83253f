//! HTTP client with retry and backoff
//!
//! The transport behind the Membership Vault facade. Every request carries
//! the configured credentials, and 429, 5xx, timeouts and refused connections
//! are retried before a response or error is handed back.

use super::response::{ApiResponse, Transport};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{is_retryable_status, Error, Result};
use crate::query::{QueryParams, QueryValue};
use crate::types::BackoffType;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First backoff delay
    pub initial_backoff: Duration,
    /// Backoff ceiling
    pub max_backoff: Duration,
    /// How the delay grows between attempts
    pub backoff_type: BackoffType,
    /// User agent string
    pub user_agent: String,
    /// Turn 4xx/5xx responses into errors instead of returning them
    pub error_for_status: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            user_agent: format!("pbs-mvault/{}", env!("CARGO_PKG_VERSION")),
            error_for_status: true,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Choose whether error statuses are raised or returned
    pub fn error_for_status(mut self, enabled: bool) -> Self {
        self.config.error_for_status = enabled;
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Per-request overrides
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters; dropped values are never sent
    pub query: QueryParams,
    /// JSON body
    pub body: Option<Value>,
    /// Timeout override
    pub timeout: Option<Duration>,
    /// Retry override
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key, value);
        self
    }

    /// Replace all query parameters
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// HTTP client with retry and backoff.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Authenticator,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            config,
            authenticator: Authenticator::default(),
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.set_authenticator(auth_config);
        Ok(client)
    }

    /// Set the authenticator
    pub fn set_authenticator(&mut self, auth_config: AuthConfig) {
        self.authenticator = Authenticator::new(auth_config);
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Return error statuses instead of raising them.
    ///
    /// Callers that classify statuses themselves need every response.
    #[must_use]
    pub fn returning_error_statuses(mut self) -> Self {
        self.config.error_for_status = false;
        self
    }

    /// GET `url` with query and overrides
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<ApiResponse> {
        self.request(Method::GET, url, config).await
    }

    /// Send a request, retrying transient failures.
    ///
    /// The returned response is fully read. With `error_for_status` off,
    /// whatever status survives the retries is returned as is.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<ApiResponse> {
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut attempt = 0;
        loop {
            let sent = self.build(method.clone(), url, &config, timeout).send().await;

            if attempt < max_retries {
                if let Some((delay, cause)) = self.retry_delay(&sent, attempt) {
                    warn!(
                        %method,
                        url,
                        cause,
                        attempt = attempt + 1,
                        of = max_retries + 1,
                        ?delay,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    continue;
                }
            }

            return self.finish(&method, url, sent, timeout).await;
        }
    }

    fn build(
        &self,
        method: Method,
        url: &str,
        config: &RequestConfig,
        timeout: Duration,
    ) -> RequestBuilder {
        let mut req = self.client.request(method, url).timeout(timeout);

        let query = config.query.pairs();
        if !query.is_empty() {
            trace!(?query, "query parameters");
            req = req.query(&query);
        }
        if let Some(body) = &config.body {
            req = req.json(body);
        }
        self.authenticator.apply(req)
    }

    /// Delay before the next attempt and its cause, or `None` when the
    /// outcome is final
    fn retry_delay(
        &self,
        sent: &reqwest::Result<Response>,
        attempt: u32,
    ) -> Option<(Duration, &'static str)> {
        match sent {
            Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                let delay = retry_after(response)
                    .map_or_else(|| self.calculate_backoff(attempt), Duration::from_secs);
                Some((delay, "rate limited"))
            }
            Ok(response) if is_retryable_status(response.status().as_u16()) => {
                Some((self.calculate_backoff(attempt), "server error"))
            }
            Err(e) if e.is_timeout() => Some((self.calculate_backoff(attempt), "timeout")),
            Err(e) if e.is_connect() => Some((self.calculate_backoff(attempt), "connection error")),
            _ => None,
        }
    }

    async fn finish(
        &self,
        method: &Method,
        url: &str,
        sent: reqwest::Result<Response>,
        timeout: Duration,
    ) -> Result<ApiResponse> {
        let response = sent.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        debug!(%method, url, status = status.as_u16(), "response");

        if self.config.error_for_status {
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(Error::RateLimited {
                    retry_after_seconds: retry_after(&response).unwrap_or(0),
                });
            }
            if status.is_client_error() || status.is_server_error() {
                let rejected = ApiResponse::read(response).await?;
                return Err(Error::http_status(rejected.status, rejected.reason));
            }
        }

        ApiResponse::read(response).await
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch(&self, url: &str, query: &QueryParams) -> Result<ApiResponse> {
        self.get_with_config(url, RequestConfig::new().with_query(query.clone()))
            .await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("auth", self.authenticator.config())
            .finish_non_exhaustive()
    }
}

/// Seconds from a `Retry-After` header
fn retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}
