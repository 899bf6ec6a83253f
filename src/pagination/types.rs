//! Page envelope types
//!
//! One API page, normalized from either wire shape.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::cursor::PAGE_PARAM;

/// Pagination counters reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Total number of matching records across all pages
    #[serde(default)]
    pub total_items_count: u64,
    /// Page size used by the server
    #[serde(default)]
    pub items_per_page: u64,
    /// 1-based number of this page
    #[serde(default)]
    pub current_page_number: u32,
    /// Link to the next page, absent on the last one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_url: Option<String>,
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageEnvelope {
    /// Records on this page, in server order
    #[serde(default)]
    pub objects: Vec<Value>,
    /// Counters; absent for a synthesized empty page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_info: Option<CollectionInfo>,
}

/// The two shapes a list response can take on the wire
#[derive(Deserialize)]
#[serde(untagged)]
enum WireShape {
    Flat(Vec<Value>),
    Paged(PageEnvelope),
}

impl PageEnvelope {
    /// A page with no records and no counters
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a bare array as a single complete page
    pub fn from_flat(objects: Vec<Value>) -> Self {
        let count = objects.len() as u64;
        Self {
            objects,
            collection_info: Some(CollectionInfo {
                total_items_count: count,
                items_per_page: count,
                current_page_number: 1,
                next_page_url: None,
            }),
        }
    }

    /// Decode a response body in either shape; an empty body is an empty page
    pub fn decode(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::empty());
        }
        Ok(match serde_json::from_str::<WireShape>(body)? {
            WireShape::Flat(objects) => Self::from_flat(objects),
            WireShape::Paged(envelope) => envelope,
        })
    }

    /// Total matching records, 0 without counters
    pub fn total_items(&self) -> u64 {
        self.collection_info
            .as_ref()
            .map_or(0, |info| info.total_items_count)
    }

    /// `ceil(total / per_page)`, 0 without counters or items
    pub fn page_count(&self) -> u64 {
        match &self.collection_info {
            Some(info) if info.total_items_count > 0 => {
                if info.items_per_page == 0 {
                    1
                } else {
                    info.total_items_count.div_ceil(info.items_per_page)
                }
            }
            _ => 0,
        }
    }

    /// Page number the server says this is
    pub fn page_number(&self) -> Option<u32> {
        self.collection_info
            .as_ref()
            .map(|info| info.current_page_number)
    }

    /// Page number from the `page` parameter of `next_page_url`.
    ///
    /// Relative links are resolved against a placeholder origin; only the
    /// query matters.
    pub fn next_page(&self) -> Option<u32> {
        let raw = self.collection_info.as_ref()?.next_page_url.as_deref()?;
        let base = Url::parse("http://localhost/").ok()?;
        let url = base.join(raw).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == PAGE_PARAM)
            .and_then(|(_, value)| value.parse().ok())
    }

    /// True when the page carries no records
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
