//! Membership request and lookup types

use crate::query::{utc_format, QueryParams};
use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a single membership was looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupType {
    /// By membership id
    Id,
    /// By activation token
    Token,
}

impl fmt::Display for LookupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupType::Id => f.write_str("id"),
            LookupType::Token => f.write_str("token"),
        }
    }
}

/// Predicate of the `memberships/filter/...` endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Currently active memberships
    Active,
    /// Memberships associated with an account
    Activated,
    /// Provisional memberships
    Provisional,
    /// Expired memberships still in their grace period
    GracePeriod,
    /// Deleted memberships
    Deleted,
    /// Memberships with this email address
    Email(String),
    /// Memberships activated by this account UID
    Uid(String),
    /// The membership with this activation token
    Token(String),
}

impl Filter {
    /// Path name of the predicate
    pub fn predicate(&self) -> &'static str {
        match self {
            Filter::Active => "active",
            Filter::Activated => "activated",
            Filter::Provisional => "provisional",
            Filter::GracePeriod => "grace_period",
            Filter::Deleted => "deleted",
            Filter::Email(_) => "email",
            Filter::Uid(_) => "uid",
            Filter::Token(_) => "token",
        }
    }

    /// Value segment following the predicate, if any
    pub fn value(&self) -> Option<&str> {
        match self {
            Filter::Email(v) | Filter::Uid(v) | Filter::Token(v) => Some(v),
            _ => None,
        }
    }

    /// Path segments below `memberships/`
    pub fn segments(&self) -> Vec<&str> {
        let mut segments = vec!["filter", self.predicate()];
        segments.extend(self.value());
        segments
    }
}

/// Optional filters and starting page for list queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Only records changed since this time
    pub since: Option<DateTime<Utc>>,
    /// Lower bound on the membership start date
    pub start_date: Option<DateTime<Utc>>,
    /// Upper bound on the membership start date
    pub end_date: Option<DateTime<Utc>>,
    /// Restrict to one email address
    pub email: Option<String>,
    /// Only records updated since this time
    pub last_updated_since: Option<DateTime<Utc>>,
    /// Page to start (and restart) from; defaults to 1
    pub page: Option<u32>,
}

impl ListOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `since`
    #[must_use]
    pub fn since(mut self, value: DateTime<Utc>) -> Self {
        self.since = Some(value);
        self
    }

    /// Set the start date window
    #[must_use]
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Set `email`
    #[must_use]
    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Set `last_updated_since`
    #[must_use]
    pub fn last_updated_since(mut self, value: DateTime<Utc>) -> Self {
        self.last_updated_since = Some(value);
        self
    }

    /// Start from a page other than the first
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// First page for the cursor
    pub fn first_page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    /// Base query for the cursor; the page is handled separately
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .with("since", self.since)
            .with("start_date", self.start_date)
            .with("end_date", self.end_date)
            .with("email", self.email.clone())
            .with("last_updated_since", self.last_updated_since)
    }
}

/// Writable membership fields.
///
/// Unset fields are left out of the request body, so the same type serves
/// create (full) and update (partial) requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MembershipFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Offer (benefit level) key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `On` or `Off`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisional: Option<bool>,
    #[serde(
        default,
        with = "utc_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "utc_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_metadata: Option<String>,
    /// Any other field accepted by the API
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl MembershipFields {
    /// Empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary field
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
