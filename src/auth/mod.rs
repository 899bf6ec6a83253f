//! Authentication module
//!
//! The Membership Vault API authenticates every request with HTTP Basic
//! credentials: the station's API key as the user name and its secret as
//! the password.

mod authenticator;

pub use authenticator::{AuthConfig, Authenticator};

#[cfg(test)]
mod tests;
