//! Paged response cursor

use super::types::PageEnvelope;
use crate::error::Result;
use crate::http::{classify, Outcome, Transport};
use crate::query::QueryParams;
use tracing::debug;

/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "page";

/// Cursor over the pages of one list query.
///
/// Holds the logical current page separately from the last fetched
/// envelope. Moving the logical page never fetches; reading it with
/// [`current`](Self::current) fetches only when the two disagree.
///
/// Not safe to drive from two traversals at once.
pub struct PagedCursor<'c> {
    transport: &'c dyn Transport,
    endpoint: String,
    query: QueryParams,
    first_page: u32,
    current_page: Option<u32>,
    page: PageEnvelope,
    fetched_page: Option<u32>,
    total_items: u64,
    page_count: u64,
}

impl<'c> PagedCursor<'c> {
    /// Open a cursor and fetch `first_page` to seed the counters.
    ///
    /// Fails with the classified error if the API rejects the query.
    pub async fn open(
        transport: &'c dyn Transport,
        endpoint: impl Into<String>,
        query: QueryParams,
        first_page: u32,
    ) -> Result<Self> {
        let first_page = first_page.max(1);
        let mut cursor = Self {
            transport,
            endpoint: endpoint.into(),
            query,
            first_page,
            current_page: Some(first_page),
            page: PageEnvelope::empty(),
            fetched_page: None,
            total_items: 0,
            page_count: 0,
        };
        cursor.fetch(first_page).await?;
        Ok(cursor)
    }

    /// Envelope for the logical current page, `None` past the last page
    pub async fn current(&mut self) -> Result<Option<&PageEnvelope>> {
        let Some(page) = self.current_page else {
            return Ok(None);
        };
        if self.fetched_page != Some(page) {
            self.fetch(page).await?;
        }
        Ok(Some(&self.page))
    }

    /// Move to the page linked from the last fetched envelope
    pub fn advance(&mut self) {
        self.current_page = self.page.next_page();
    }

    /// Move back to the first page
    pub fn restart(&mut self) {
        self.current_page = Some(self.first_page);
    }

    /// True while there is a current page and the query matched anything
    pub fn is_valid(&self) -> bool {
        self.current_page.is_some() && self.total_items > 0
    }

    /// Number of pages as of the last fetch
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// Number of matching records as of the last fetch
    pub fn total_count(&self) -> u64 {
        self.total_items
    }

    /// Logical current page
    pub fn current_page(&self) -> Option<u32> {
        self.current_page
    }

    /// Page the cursor restarts from
    pub fn first_page(&self) -> u32 {
        self.first_page
    }

    /// Endpoint URL being paged
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Base query sent with every page
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Last fetched envelope, which may lag the logical current page
    pub fn last_page(&self) -> &PageEnvelope {
        &self.page
    }

    async fn fetch(&mut self, page: u32) -> Result<()> {
        // Page 1 is the API default and is never sent explicitly.
        let query = if page > 1 {
            self.query
                .merged(&QueryParams::new().with(PAGE_PARAM, page))
        } else {
            self.query.clone()
        };

        debug!(endpoint = %self.endpoint, page, "fetching page");
        let response = self.transport.fetch(&self.endpoint, &query).await?;

        let envelope = match classify(response)? {
            Outcome::Success(response) => PageEnvelope::decode(&response.body)?,
            Outcome::NotFound(_) => PageEnvelope::empty(),
        };

        self.total_items = envelope.total_items();
        self.page_count = envelope.page_count();
        self.page = envelope;
        self.fetched_page = Some(page);
        Ok(())
    }
}

impl std::fmt::Debug for PagedCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedCursor")
            .field("endpoint", &self.endpoint)
            .field("query", &self.query)
            .field("first_page", &self.first_page)
            .field("current_page", &self.current_page)
            .field("fetched_page", &self.fetched_page)
            .field("total_items", &self.total_items)
            .field("page_count", &self.page_count)
            .finish_non_exhaustive()
    }
}
