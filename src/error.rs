//! Error types for the Membership Vault client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! API rejections (400/401/403/409) surface as [`BadRequest`], which keeps
//! the per-field messages from the response body. The two activation
//! conflict variants are specialisations of it and keep the original
//! `BadRequest` as their source.

use crate::membership::{Conflict, LookupType};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Key used by the API for messages that are not tied to a single field
pub const GENERAL_ERRORS: &str = "__all__";

/// Field-keyed error messages returned by the API
pub type ErrorMessages = BTreeMap<String, Vec<String>>;

/// A 4xx rejection from the API carrying structured error detail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Bad request (HTTP {code}): {}", summarize(.errors))]
pub struct BadRequest {
    /// HTTP status code of the response
    pub code: u16,
    /// Messages keyed by field name, `__all__` for general messages
    pub errors: ErrorMessages,
}

impl BadRequest {
    /// Create a bad request from already-parsed messages
    pub fn new(code: u16, errors: ErrorMessages) -> Self {
        Self { code, errors }
    }

    /// Create a bad request with a single general message
    pub fn general(code: u16, message: impl Into<String>) -> Self {
        let mut errors = ErrorMessages::new();
        errors.insert(GENERAL_ERRORS.to_string(), vec![message.into()]);
        Self { code, errors }
    }

    /// Build from a response body.
    ///
    /// Uses the body's `errors` object when present. Otherwise the reason
    /// phrase becomes the only `__all__` message.
    pub fn from_body(code: u16, reason: &str, body: &str) -> Self {
        let errors = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("errors").map(parse_messages))
            .filter(|m| !m.is_empty());

        match errors {
            Some(errors) => Self { code, errors },
            None => Self::general(code, reason),
        }
    }

    /// General (non-field) messages, in the order the API sent them
    pub fn general_messages(&self) -> &[String] {
        self.field_messages(GENERAL_ERRORS)
    }

    /// Messages for a single field
    pub fn field_messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }
}

/// Normalize an `errors` value into field-keyed message lists.
///
/// Fields may carry a list of strings or a single string; a bare string or
/// list at the top level is treated as general messages.
fn parse_messages(value: &Value) -> ErrorMessages {
    let mut errors = ErrorMessages::new();
    match value {
        Value::Object(map) => {
            for (field, messages) in map {
                let messages = message_list(messages);
                if !messages.is_empty() {
                    errors.insert(field.clone(), messages);
                }
            }
        }
        Value::Null => {}
        other => {
            let messages = message_list(other);
            if !messages.is_empty() {
                errors.insert(GENERAL_ERRORS.to_string(), messages);
            }
        }
    }
    errors
}

fn message_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(message_list).collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

fn summarize(errors: &ErrorMessages) -> String {
    errors
        .iter()
        .map(|(field, messages)| {
            if field == GENERAL_ERRORS {
                messages.join("; ")
            } else {
                format!("{field}: {}", messages.join("; "))
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// The main error type for the Membership Vault client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // API Errors
    // ============================================================================
    #[error(transparent)]
    BadRequest(#[from] BadRequest),

    #[error("Membership not found by {lookup}: {value}")]
    NotFound { lookup: LookupType, value: String },

    #[error(
        "Membership {} was already activated with UID {}",
        .conflict.membership_id(),
        .conflict.uid()
    )]
    MembershipAlreadyActivated {
        conflict: Conflict,
        #[source]
        source: BadRequest,
    },

    #[error(
        "UID {} has already activated membership {}",
        .conflict.uid(),
        .conflict.membership_id()
    )]
    AnotherMembershipActivated {
        conflict: Conflict,
        #[source]
        source: BadRequest,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, reason: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            reason: reason.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(lookup: LookupType, value: impl Into<String>) -> Self {
        Self::NotFound {
            lookup,
            value: value.into(),
        }
    }

    /// The bad request behind this error, if it is one.
    ///
    /// Activation conflicts are specialisations of a bad request, so they
    /// return their source here too.
    pub fn bad_request(&self) -> Option<&BadRequest> {
        match self {
            Error::BadRequest(inner) => Some(inner),
            Error::MembershipAlreadyActivated { source, .. }
            | Error::AnotherMembershipActivated { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Numeric code of an API or HTTP status error
    pub fn code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::NotFound { .. } => Some(404),
            _ => self.bad_request().map(|b| b.code),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
