//! Record-level view over a paged cursor

use super::cursor::PagedCursor;
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::query::QueryParams;
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use std::pin::Pin;

/// Field used to key records unless overridden
pub const DEFAULT_KEY_FIELD: &str = "membership_id";

/// A record paired with its identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Value of the key field
    pub key: String,
    /// The record as returned by the API
    pub value: Value,
}

impl Record {
    /// Key a record by `field`; strings and numbers are accepted
    pub fn keyed(field: &str, value: Value) -> Result<Self> {
        let key = match value.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(Error::decode(format!(
                    "record has no usable '{field}' field"
                )))
            }
        };
        Ok(Self { key, value })
    }
}

/// Stream of records produced by one traversal
pub type RecordStream<'a> = Pin<Box<dyn Stream<Item = Result<Record>> + Send + 'a>>;

/// Lazy, restartable sequence of the records behind a [`PagedCursor`].
///
/// Every call to [`stream`](Self::stream) starts a fresh traversal from the
/// cursor's first page. Pages are fetched as the stream is polled; records
/// reflect the server state at each page fetch.
#[derive(Debug)]
pub struct ResultSet<'c> {
    cursor: PagedCursor<'c>,
    key_field: String,
}

impl<'c> ResultSet<'c> {
    /// Wrap an open cursor
    pub fn new(cursor: PagedCursor<'c>) -> Self {
        Self {
            cursor,
            key_field: DEFAULT_KEY_FIELD.to_string(),
        }
    }

    /// Open a cursor on `endpoint` and wrap it
    pub async fn open(
        transport: &'c dyn Transport,
        endpoint: impl Into<String>,
        query: QueryParams,
        first_page: u32,
    ) -> Result<Self> {
        let cursor = PagedCursor::open(transport, endpoint, query, first_page).await?;
        Ok(Self::new(cursor))
    }

    /// Key records by a different field
    #[must_use]
    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    /// Total matching records reported by the server; never fetches
    pub fn count(&self) -> u64 {
        self.cursor.total_count()
    }

    /// Read-only view of the cursor
    pub fn cursor(&self) -> &PagedCursor<'c> {
        &self.cursor
    }

    /// Start a traversal from the first page
    pub fn stream(&mut self) -> RecordStream<'_> {
        self.cursor.restart();
        let key_field = self.key_field.as_str();
        Box::pin(stream::try_unfold(
            (&mut self.cursor, 0usize),
            move |(cursor, index)| async move {
                next_record(&mut *cursor, index, key_field)
                    .await
                    .map(|next| next.map(|(record, index)| (record, (cursor, index))))
            },
        ))
    }

    /// Run one full traversal and collect it
    pub async fn collect(&mut self) -> Result<Vec<Record>> {
        self.stream().try_collect().await
    }
}

/// Record at `index` on the current page, advancing past exhausted pages.
///
/// Returns the record and the index to resume from.
async fn next_record(
    cursor: &mut PagedCursor<'_>,
    mut index: usize,
    key_field: &str,
) -> Result<Option<(Record, usize)>> {
    while cursor.is_valid() {
        let value = match cursor.current().await? {
            Some(page) => page.objects.get(index).cloned(),
            None => break,
        };
        match value {
            Some(value) => return Ok(Some((Record::keyed(key_field, value)?, index + 1))),
            None => {
                cursor.advance();
                index = 0;
            }
        }
    }
    Ok(None)
}
