//! Pagination module
//!
//! Turns the Membership Vault's paged list endpoints into one lazily
//! evaluated, restartable collection of records.
//!
//! # Overview
//!
//! - [`PageEnvelope`] is the normalized form of one response. Both the
//!   paged object shape and a bare JSON array decode into it.
//! - [`PagedCursor`] tracks the logical current page and re-fetches only
//!   when that page differs from the one last fetched.
//! - [`ResultSet`] flattens the cursor's pages into a [`Stream`] of
//!   [`Record`]s, restarting from the first page on every traversal.
//!
//! Neither type supports concurrent traversals; `stream()` takes
//! `&mut self`.
//!
//! [`Stream`]: futures::Stream

mod cursor;
mod results;
mod types;

pub use cursor::{PagedCursor, PAGE_PARAM};
pub use results::{Record, RecordStream, ResultSet, DEFAULT_KEY_FIELD};
pub use types::{CollectionInfo, PageEnvelope};
