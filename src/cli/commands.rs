//! CLI commands and argument parsing

use crate::membership::{Filter, ListOptions};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// PBS Membership Vault CLI
#[derive(Parser, Debug)]
#[command(name = "mvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML); MVAULT_* environment variables otherwise
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one membership by id
    Get {
        /// Membership id
        membership_id: String,
    },

    /// Fetch the membership holding an activation token
    Token {
        /// Activation token
        token: String,
    },

    /// Stream matching memberships, one record per line
    List {
        #[command(flatten)]
        query: ListArgs,

        /// Stop after this many records
        #[arg(long)]
        max_records: Option<usize>,
    },

    /// Print the number of matching memberships
    Count {
        #[command(flatten)]
        query: ListArgs,
    },

    /// Associate a membership with an account UID
    Activate {
        /// Membership id
        membership_id: String,

        /// Account UID
        uid: String,
    },

    /// Delete a membership
    Delete {
        /// Membership id
        membership_id: String,
    },
}

/// Filter and query options shared by `list` and `count`
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Restrict to a predefined subset
    #[arg(long, conflicts_with_all = ["email", "uid"])]
    pub filter: Option<FilterArg>,

    /// Memberships with this email address
    #[arg(long, conflicts_with = "uid")]
    pub email: Option<String>,

    /// Memberships activated by this account UID
    #[arg(long)]
    pub uid: Option<String>,

    /// Only records changed since (RFC 3339)
    #[arg(long)]
    pub since: Option<DateTime<Utc>>,

    /// Lower bound on the start date (RFC 3339)
    #[arg(long)]
    pub start_date: Option<DateTime<Utc>>,

    /// Upper bound on the start date (RFC 3339)
    #[arg(long)]
    pub end_date: Option<DateTime<Utc>>,

    /// Only records updated since (RFC 3339)
    #[arg(long)]
    pub last_updated_since: Option<DateTime<Utc>>,

    /// Page to start from
    #[arg(long)]
    pub page: Option<u32>,
}

impl ListArgs {
    /// Endpoint filter, if any
    pub fn filter(&self) -> Option<Filter> {
        if let Some(email) = &self.email {
            return Some(Filter::Email(email.clone()));
        }
        if let Some(uid) = &self.uid {
            return Some(Filter::Uid(uid.clone()));
        }
        self.filter.map(Filter::from)
    }

    /// Query options
    pub fn options(&self) -> ListOptions {
        ListOptions {
            since: self.since,
            start_date: self.start_date,
            end_date: self.end_date,
            email: None,
            last_updated_since: self.last_updated_since,
            page: self.page,
        }
    }
}

/// Predefined subsets selectable with `--filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FilterArg {
    Active,
    Activated,
    Provisional,
    GracePeriod,
    Deleted,
}

impl From<FilterArg> for Filter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Active => Filter::Active,
            FilterArg::Activated => Filter::Activated,
            FilterArg::Provisional => Filter::Provisional,
            FilterArg::GracePeriod => Filter::GracePeriod,
            FilterArg::Deleted => Filter::Deleted,
        }
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
