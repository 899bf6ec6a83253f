//! CLI module
//!
//! Command-line interface for the Membership Vault.
//!
//! # Commands
//!
//! - `get` - Fetch one membership by id
//! - `token` - Fetch a membership by activation token
//! - `list` - Stream matching memberships as JSON lines
//! - `count` - Number of matching memberships
//! - `activate` - Associate a membership with an account
//! - `delete` - Delete a membership

mod commands;
mod runner;

pub use commands::{Cli, Commands, FilterArg, ListArgs, OutputFormat};
pub use runner::Runner;
