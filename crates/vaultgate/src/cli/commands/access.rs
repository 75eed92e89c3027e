//! Access queries

use clap::{Args, Subcommand};
use console::style;

use vaultgate_org::OrgError;

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes::Denied;
use crate::store::Context;

/// Query who can reach which vault
#[derive(Debug, Args)]
pub struct AccessCommand {
    #[command(subcommand)]
    pub command: AccessSubcommand,
}

/// Access subcommands
#[derive(Debug, Subcommand)]
pub enum AccessSubcommand {
    /// Vaults a member can reach, directly or through groups
    Vaults {
        /// Member account id
        member: String,
    },

    /// Members with access to a vault
    Accessors {
        /// Vault id
        vault: String,
    },

    /// Check whether a member can read or write a vault
    Check {
        /// Vault id
        vault: String,
        /// Member account id
        member: String,

        /// Require write access
        #[arg(long)]
        write: bool,
    },
}

impl AccessCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let org = ctx.load_org()?;

        match &self.command {
            AccessSubcommand::Vaults { member } => {
                let vaults = org.get_vaults_for_member(member)?;
                match cli.format {
                    OutputFormat::Json => output::json(&vaults)?,
                    OutputFormat::Text => {
                        for id in vaults {
                            let name = org
                                .vaults
                                .iter()
                                .find(|v| v.id == id)
                                .map(|v| v.name.as_str())
                                .unwrap_or("(unregistered)");
                            let mode = if org.can_write(id, member) { "write" } else { "read" };
                            println!("  {} {} [{}]", style(name).cyan(), style(id).dim(), mode);
                        }
                    }
                }
            }
            AccessSubcommand::Accessors { vault } => {
                let accessors = org.get_accessors(vault);
                match cli.format {
                    OutputFormat::Json => {
                        let ids: Vec<&str> = accessors.iter().map(|m| m.id.as_str()).collect();
                        output::json(&ids)?;
                    }
                    OutputFormat::Text => {
                        for member in accessors {
                            println!(
                                "  {} <{}> [{}]",
                                style(&member.name).cyan(),
                                member.email,
                                output::role_style(member.role)
                            );
                        }
                    }
                }
            }
            AccessSubcommand::Check {
                vault,
                member,
                write,
            } => {
                if org.get_member(member).is_none() {
                    return Err(OrgError::MemberNotFound(member.clone()).into());
                }
                let can_read = org.can_read(vault, member);
                let can_write = org.can_write(vault, member);

                match cli.format {
                    OutputFormat::Json => output::json(&serde_json::json!({
                        "vault": vault,
                        "member": member,
                        "read": can_read,
                        "write": can_write,
                    }))?,
                    OutputFormat::Text => {
                        let access = match (can_read, can_write) {
                            (_, true) => style("read-write").green(),
                            (true, false) => style("read-only").yellow(),
                            (false, false) => style("none").red(),
                        };
                        println!("{}", output::key_value(member, &access.to_string()));
                    }
                }

                let allowed = if *write { can_write } else { can_read };
                if !allowed {
                    return Err(Denied {
                        member: member.clone(),
                        vault: vault.clone(),
                        mode: if *write { "write" } else { "read" },
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}
