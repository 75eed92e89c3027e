//! Vault registry commands

use clap::{Args, Subcommand};
use console::style;

use crate::cli::{output, Cli, OutputFormat};
use crate::store::Context;

/// Vault commands
#[derive(Debug, Args)]
pub struct VaultCommand {
    #[command(subcommand)]
    pub command: VaultSubcommand,
}

/// Vault subcommands
#[derive(Debug, Subcommand)]
pub enum VaultSubcommand {
    /// List vaults
    List,

    /// Register a vault (renames it if the id exists)
    Add {
        /// Vault id
        id: String,
        /// Vault name
        name: String,
    },

    /// Remove a vault and every assignment of it
    Remove {
        /// Vault id
        id: String,
    },
}

impl VaultCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let mut org = ctx.load_org()?;

        match &self.command {
            VaultSubcommand::List => match cli.format {
                OutputFormat::Json => {
                    let vaults: Vec<_> = org
                        .vaults
                        .iter()
                        .map(|v| {
                            serde_json::json!({
                                "id": v.id,
                                "name": v.name,
                                "accessors": org
                                    .get_accessors(&v.id)
                                    .iter()
                                    .map(|m| m.id.as_str())
                                    .collect::<Vec<_>>(),
                            })
                        })
                        .collect();
                    output::json(&vaults)?;
                }
                OutputFormat::Text => {
                    println!("{}", output::header("Vaults"));
                    println!();
                    for vault in &org.vaults {
                        println!(
                            "  {} {} ({} accessor(s))",
                            style(&vault.name).cyan(),
                            style(&vault.id).dim(),
                            org.get_accessors(&vault.id).len()
                        );
                    }
                }
            },
            VaultSubcommand::Add { id, name } => {
                org.add_vault(id.as_str(), name.as_str());
                ctx.save_org(&org)?;
                if !cli.quiet {
                    output::success(&format!("Registered vault {}", style(name).cyan()));
                }
            }
            VaultSubcommand::Remove { id } => {
                let vault = org.remove_vault(id)?;
                ctx.save_org(&org)?;
                if !cli.quiet {
                    output::success(&format!("Removed vault {}", style(&vault.name).cyan()));
                }
            }
        }
        Ok(())
    }
}
