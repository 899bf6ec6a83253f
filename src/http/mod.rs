//! HTTP module
//!
//! Transport client, fully-read responses and status classification.
//!
//! # Features
//!
//! - **Automatic Retries**: 429/5xx responses, timeouts and connection
//!   errors are retried with backoff
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Authentication**: Basic credentials from the auth module
//! - **Status Classification**: Maps API responses onto success, not found,
//!   [`BadRequest`](crate::error::BadRequest) or a fatal status error

mod client;
mod response;
mod status;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use response::{ApiResponse, Transport};
pub use status::{classify, Outcome};
