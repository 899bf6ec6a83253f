// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # PBS Membership Vault client
//!
//! Async client for a station's Membership Vault: single-record lookups,
//! create/update/delete, account activation with typed conflicts, and lazy
//! paginated listing.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use pbs_mvault::{ListOptions, MembershipVault, Result, VaultConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let vault = MembershipVault::new(&VaultConfig::from_env()?)?;
//!
//!     // Counts are known as soon as the list is opened
//!     let mut active = vault.list_active(&ListOptions::new()).await?;
//!     println!("{} active memberships", active.count());
//!
//!     // Pages are fetched as the stream is polled
//!     let mut records = active.stream();
//!     while let Some(record) = records.try_next().await? {
//!         println!("{}", record.key);
//!     }
//!
//!     vault.activate_membership("m-1", "account-uid").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      MembershipVault                         │
//! │  get / token / create / add / update / delete / activate     │
//! │  list(filter, options) → ResultSet                           │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌────────────┬────────────────┼─────────────────┬──────────────┐
//! │   Query    │     HTTP       │   Pagination    │   Conflict   │
//! ├────────────┼────────────────┼─────────────────┼──────────────┤
//! │ Values     │ Basic auth     │ PagedCursor     │ 409 message  │
//! │ Dates      │ Retry/Backoff  │ ResultSet       │ templates    │
//! │ Encoding   │ Classify       │ Record stream   │              │
//! └────────────┴────────────────┴─────────────────┴──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Query parameter values and encoding
pub mod query;

/// Authentication
pub mod auth;

/// HTTP transport with retry and status classification
pub mod http;

/// Paged cursor and record sequences
pub mod pagination;

/// Membership operations
pub mod membership;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::VaultConfig;
pub use error::{BadRequest, Error, Result};
pub use membership::{
    ActivationConflict, Conflict, Filter, ListOptions, LookupType, MembershipFields,
    MembershipVault,
};
pub use pagination::{PagedCursor, Record, ResultSet};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
