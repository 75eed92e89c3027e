//! Key rotation command

use clap::Args;
use console::style;
use tracing::info;

use vaultgate_org::KeyContainer;

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes::Cancelled;
use crate::store::Context;

/// Rotate the organization signing key and invites key
#[derive(Debug, Args)]
pub struct RotateCommand {
    /// Skip verifying current members before rotating
    #[arg(long)]
    pub force: bool,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl RotateCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;

        if self.force && !self.yes {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(
                    "Rotate without verifying members? Every member, including tampered ones, will be re-signed",
                )
                .default(false)
                .interact()?;

            if !confirmed {
                println!("{}", style("Aborted.").yellow());
                return Err(Cancelled.into());
            }
        }

        let account = ctx.load_account()?;
        let mut org = ctx.load_org()?;
        let previous = org.fingerprint();

        {
            let mut unlocked = ctx.unlock(&mut org, &account).await?;
            unlocked.rotate_keys(self.force).await?;
            unlocked.lock();
        }
        ctx.save_org(&org)?;

        let owners: Vec<&str> = org
            .container
            .accessors()
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        info!(org = %org.id, owners = owners.len(), "keys rotated");

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "previous_fingerprint": previous,
                "fingerprint": org.fingerprint(),
                "members": org.members.len(),
                "key_accessors": owners,
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success("Organization keys rotated");
                    println!(
                        "{}",
                        output::key_value("Previous", &previous.unwrap_or_default())
                    );
                    println!(
                        "{}",
                        output::key_value(
                            "Current",
                            &style(org.fingerprint().unwrap_or_default()).green().to_string()
                        )
                    );
                    println!(
                        "{}",
                        output::key_value("Re-signed", &org.members.len().to_string())
                    );
                    println!("{}", output::key_value("Key access", &owners.join(", ")));
                }
            }
        }
        Ok(())
    }
}
