//! Account key commands

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use vaultgate_org::Account;

use crate::cli::{output, Cli, OutputFormat};
use crate::store::{self, Context};

/// Account commands
#[derive(Debug, Args)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountSubcommand {
    /// Generate a new account key file
    New(AccountNewCommand),

    /// Show the public key of the configured account
    Show(AccountShowCommand),
}

/// Generate a new account
#[derive(Debug, Args)]
pub struct AccountNewCommand {
    /// Account id (default: the email address)
    #[arg(long)]
    pub id: Option<String>,

    /// Display name
    #[arg(long, required = true)]
    pub name: String,

    /// Email address
    #[arg(long, required = true)]
    pub email: String,

    /// Where to write the key file (default: --account, then ~/.vaultgate/account.yaml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Show the configured account
#[derive(Debug, Args)]
pub struct AccountShowCommand {}

impl AccountCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            AccountSubcommand::New(cmd) => cmd.execute(cli),
            AccountSubcommand::Show(cmd) => cmd.execute(cli),
        }
    }
}

impl AccountNewCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let path = self
            .output
            .clone()
            .or_else(|| cli.account.clone())
            .or_else(store::default_account_file)
            .context("Could not determine where to write the key file; pass --output")?;

        let id = self.id.clone().unwrap_or_else(|| self.email.clone());
        let account = Account::generate(id, &self.name, &self.email);
        store::save_account(&path, &account)?;
        info!(account = %account.id, "generated account");

        let public_key = account.public_key();
        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "id": account.id,
                "path": path.to_string_lossy(),
                "public_key": public_key,
                "fingerprint": public_key.fingerprint(),
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "Account {} written to {}",
                        style(&account.id).cyan(),
                        path.display()
                    ));
                    println!("{}", output::key_value("Fingerprint", &public_key.fingerprint()));
                    println!("{}", output::key_value("Recipient", &public_key.encryption));
                    println!();
                    println!(
                        "{}",
                        style("Keep this file secret. Anyone holding it can act as this account.")
                            .yellow()
                    );
                }
            }
        }
        Ok(())
    }
}

impl AccountShowCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let account = ctx.load_account()?;
        let public_key = account.public_key();

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "id": account.id,
                "name": account.name,
                "email": account.email,
                "public_key": public_key,
                "fingerprint": public_key.fingerprint(),
            }))?,
            OutputFormat::Text => {
                println!("{}", output::header("Account"));
                println!("{}", output::key_value("Id", &account.id));
                println!("{}", output::key_value("Name", &account.name));
                println!("{}", output::key_value("Email", &account.email));
                println!("{}", output::key_value("Fingerprint", &public_key.fingerprint()));
                println!("{}", output::key_value("Recipient", &public_key.encryption));
            }
        }
        Ok(())
    }
}
