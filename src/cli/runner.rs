//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ListArgs, OutputFormat};
use crate::config::VaultConfig;
use crate::error::{Error, Result, ResultExt};
use crate::membership::MembershipVault;
use futures::TryStreamExt;
use serde_json::{json, Value};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let vault = MembershipVault::new(&config)?;

        match &self.cli.command {
            Commands::Get { membership_id } => {
                let record = vault.get_membership(membership_id).await?;
                self.output_record(membership_id, record);
                Ok(())
            }
            Commands::Token { token } => {
                let record = vault.get_membership_by_token(token).await?;
                let key = record
                    .get("membership_id")
                    .and_then(Value::as_str)
                    .unwrap_or(token)
                    .to_string();
                self.output_record(&key, record);
                Ok(())
            }
            Commands::List { query, max_records } => {
                self.list(&vault, query, *max_records).await
            }
            Commands::Count { query } => {
                let results = vault.list(query.filter().as_ref(), &query.options()).await?;
                self.output_message(&json!({
                    "type": "COUNT",
                    "count": results.count()
                }));
                Ok(())
            }
            Commands::Activate { membership_id, uid } => {
                self.activate(&vault, membership_id, uid).await
            }
            Commands::Delete { membership_id } => {
                vault.delete_membership(membership_id).await?;
                self.output_message(&json!({
                    "type": "LOG",
                    "log": {
                        "level": "INFO",
                        "message": format!("Deleted membership {membership_id}")
                    }
                }));
                Ok(())
            }
        }
    }

    /// Load configuration from the file, or the environment
    fn load_config(&self) -> Result<VaultConfig> {
        match &self.cli.config {
            Some(path) => VaultConfig::from_file(path)
                .with_context(|| format!("Invalid config file {}", path.display())),
            None => VaultConfig::from_env().context("Invalid MVAULT_* environment"),
        }
    }

    /// Stream records to stdout
    async fn list(
        &self,
        vault: &MembershipVault,
        query: &ListArgs,
        max_records: Option<usize>,
    ) -> Result<()> {
        let filter = query.filter();
        let mut results = vault.list(filter.as_ref(), &query.options()).await?;
        let total = results.count();
        debug!(?filter, total, "listing memberships");

        let mut emitted = 0usize;
        let mut stream = results.stream();
        while let Some(record) = stream.try_next().await? {
            self.output_record(&record.key, record.value);
            emitted += 1;
            if max_records.is_some_and(|max| emitted >= max) {
                break;
            }
        }

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!("Read {emitted} of {total} memberships")
            }
        }));
        Ok(())
    }

    /// Activate and report the outcome; conflicts are reported then returned
    async fn activate(&self, vault: &MembershipVault, membership_id: &str, uid: &str) -> Result<()> {
        match vault.activate_membership(membership_id, uid).await {
            Ok(_) => {
                self.output_message(&json!({
                    "type": "ACTIVATION",
                    "activation": {
                        "status": "SUCCEEDED",
                        "membership_id": membership_id,
                        "uid": uid
                    }
                }));
                Ok(())
            }
            Err(e) => {
                if let Error::MembershipAlreadyActivated { conflict, .. }
                | Error::AnotherMembershipActivated { conflict, .. } = &e
                {
                    self.output_message(&json!({
                        "type": "ACTIVATION",
                        "activation": {
                            "status": "FAILED",
                            "membership_id": conflict.membership_id(),
                            "uid": conflict.uid(),
                            "message": conflict.message()
                        }
                    }));
                }
                Err(e)
            }
        }
    }

    fn output_record(&self, key: &str, data: Value) {
        self.output_message(&json!({
            "type": "RECORD",
            "record": {
                "key": key,
                "data": data
            }
        }));
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
