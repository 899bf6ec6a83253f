//! Query string building
//!
//! Serializes a mapping of parameter names to values into the canonical
//! query string the Membership Vault API expects. Null and empty values are
//! dropped, date-times are rendered in UTC as `YYYY-MM-DDTHH:MM:SSZ`.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Format used for every date-time sent to the API
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Render a date-time in the API's UTC format
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// A single query parameter value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryValue {
    /// Absent value, never rendered
    #[default]
    Null,
    /// Free text; dropped when empty
    Text(String),
    /// Integer value, always rendered (including 0)
    Integer(i64),
    /// Boolean rendered as `true` / `false`
    Bool(bool),
    /// Date-time rendered with [`DATETIME_FORMAT`]
    DateTime(DateTime<Utc>),
}

impl QueryValue {
    /// Render the value, or `None` when it should be dropped
    pub fn render(&self) -> Option<String> {
        match self {
            QueryValue::Null => None,
            QueryValue::Text(s) if s.is_empty() => None,
            QueryValue::Text(s) => Some(s.clone()),
            QueryValue::Integer(n) => Some(n.to_string()),
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::DateTime(dt) => Some(format_datetime(dt)),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

macro_rules! integer_query_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_query_value!(i32, i64, u16, u32);

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered set of query parameters.
///
/// Keys are kept sorted so the rendered string is canonical.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParams {
    params: BTreeMap<String, QueryValue>,
}

impl QueryParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a parameter
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Get a raw parameter value
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// Copy of these parameters with `other` layered on top
    #[must_use]
    pub fn merged(&self, other: &QueryParams) -> QueryParams {
        let mut params = self.params.clone();
        params.extend(other.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        QueryParams { params }
    }

    /// Rendered key/value pairs, skipping dropped values
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .filter_map(|(k, v)| v.render().map(|rendered| (k.clone(), rendered)))
            .collect()
    }

    /// True when nothing would be rendered
    pub fn is_empty(&self) -> bool {
        self.params.values().all(|v| v.render().is_none())
    }

    /// Canonical `application/x-www-form-urlencoded` query string
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs())
            .finish()
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Serde helper applying [`DATETIME_FORMAT`] to optional body fields.
///
/// ```rust,ignore
/// #[serde(with = "pbs_mvault::query::utc_format", skip_serializing_if = "Option::is_none")]
/// start_date: Option<DateTime<Utc>>,
/// ```
pub mod utc_format {
    use super::DATETIME_FORMAT;
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize an optional date-time
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&super::format_datetime(dt)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional date-time, accepting RFC 3339 as well
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT) {
            return Ok(Some(naive.and_utc()));
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(QueryValue::Null, None; "null is dropped")]
    #[test_case(QueryValue::from(""), None; "empty string is dropped")]
    #[test_case(QueryValue::from("0"), Some("0"); "string zero is kept")]
    #[test_case(QueryValue::from(0_i64), Some("0"); "integer zero is kept")]
    #[test_case(QueryValue::from(false), Some("false"); "false is kept")]
    #[test_case(QueryValue::from(Some("abc")), Some("abc"); "some text")]
    #[test_case(QueryValue::from(None::<String>), None; "none text")]
    fn test_render(value: QueryValue, expected: Option<&str>) {
        assert_eq!(value.render().as_deref(), expected);
    }

    #[test]
    fn test_datetime_is_rendered_in_utc() {
        let offset = chrono::FixedOffset::east_opt(5 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 3, 1, 4, 30, 15).unwrap();
        let value = QueryValue::from(local.with_timezone(&Utc));

        assert_eq!(value.render().as_deref(), Some("2024-02-29T23:30:15Z"));
    }

    #[test]
    fn test_query_string_is_canonical() {
        let params = QueryParams::new()
            .with("since", Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap())
            .with("email", "a+b@example.org")
            .with("page", 0_u32)
            .with("notes", "")
            .with("token", None::<String>);

        assert_eq!(
            params.to_query_string(),
            "email=a%2Bb%40example.org&page=0&since=2023-01-02T03%3A04%3A05Z"
        );
    }

    #[test]
    fn test_merged_overrides_base() {
        let base = QueryParams::new().with("since", "x").with("page", 1_u32);
        let merged = base.merged(&QueryParams::new().with("page", 3_u32));

        assert_eq!(merged.get("page"), Some(&QueryValue::Integer(3)));
        assert_eq!(merged.get("since"), Some(&QueryValue::from("x")));
        assert_eq!(base.get("page"), Some(&QueryValue::Integer(1)));
    }

    #[test]
    fn test_is_empty_ignores_dropped_values() {
        let params: QueryParams = vec![("a", ""), ("b", "")].into_iter().collect();
        assert!(params.is_empty());
        assert!(!params.with("c", "0").is_empty());
    }

    #[test]
    fn test_utc_format_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Body {
            #[serde(with = "utc_format", default)]
            start: Option<DateTime<Utc>>,
        }

        let body = Body {
            start: Some(Utc.with_ymd_and_hms(2022, 12, 31, 23, 59, 0).unwrap()),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"start":"2022-12-31T23:59:00Z"}"#);

        let parsed: Body = serde_json::from_str(r#"{"start":"2022-12-31T18:59:00-05:00"}"#).unwrap();
        assert_eq!(parsed, body);

        let empty: Body = serde_json::from_str(r#"{"start":null}"#).unwrap();
        assert_eq!(empty.start, None);
    }
}
