//! Membership module
//!
//! The consumer-facing surface of the crate: [`MembershipVault`] exposes
//! get/create/update/delete/activate and filtered listing of membership
//! records, composed from the query builder, the status classifier and the
//! paged [`ResultSet`](crate::pagination::ResultSet).
//!
//! Activation conflicts reported by the API as free text are classified by
//! [`parse_conflict`] into typed errors.

mod client;
mod conflict;
mod types;

pub use client::MembershipVault;
pub use conflict::{classify_activation_error, parse_conflict, ActivationConflict, Conflict};
pub use types::{Filter, ListOptions, LookupType, MembershipFields};
