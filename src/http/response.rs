//! Fully-read HTTP responses and the transport seam used by the cursor

use crate::error::Result;
use crate::query::QueryParams;
use async_trait::async_trait;
use serde_json::Value;

/// An HTTP response with its body already read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Status code
    pub status: u16,
    /// Canonical reason phrase for the status
    pub reason: String,
    /// Response body text
    pub body: String,
}

impl ApiResponse {
    /// Build a response from its parts; the reason phrase is derived from the status
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        Self {
            status,
            reason,
            body: body.into(),
        }
    }

    /// Read a reqwest response to completion
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Self::new(status, body))
    }

    /// Decode the body as JSON; an empty body decodes as `null`
    pub fn value(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The GET capability the paged cursor needs from a transport.
///
/// [`HttpClient`](super::HttpClient) is the production implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url` with the given query, returning any status
    async fn fetch(&self, url: &str, query: &QueryParams) -> Result<ApiResponse>;
}
