//! Group commands

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use vaultgate_org::Group;

use crate::cli::{output, Cli, OutputFormat};
use crate::store::Context;

/// Group commands
#[derive(Debug, Args)]
pub struct GroupCommand {
    #[command(subcommand)]
    pub command: GroupSubcommand,
}

/// Group subcommands
#[derive(Debug, Subcommand)]
pub enum GroupSubcommand {
    /// List groups with their members and vaults
    List,

    /// Create an empty group
    Add {
        /// Group name
        name: String,
    },

    /// Add a member to a group
    Member {
        /// Group name
        group: String,
        /// Member account id
        member: String,
    },

    /// Remove a group
    Remove {
        /// Group name
        name: String,
    },
}

impl GroupCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let mut org = ctx.load_org()?;

        match &self.command {
            GroupSubcommand::List => match cli.format {
                OutputFormat::Json => output::json(&org.groups)?,
                OutputFormat::Text => {
                    println!("{}", output::header("Groups"));
                    println!();
                    for group in &org.groups {
                        println!("  {}", style(&group.name).cyan());
                        let members: Vec<&str> = org
                            .get_members_for_group(group)
                            .iter()
                            .map(|m| m.name.as_str())
                            .collect();
                        println!("    Members: {}", members.join(", "));
                        for grant in &group.vaults {
                            let mode = if grant.readonly { "read" } else { "write" };
                            println!("    Vault:   {} ({})", grant.id, mode);
                        }
                    }
                }
            },
            GroupSubcommand::Add { name } => {
                if org.get_group(name).is_some() {
                    anyhow::bail!("Group '{}' already exists", name);
                }
                org.put_group(Group::new(name.as_str()));
                ctx.save_org(&org)?;
                info!(group = %name, "created group");
                if !cli.quiet {
                    output::success(&format!("Created group {}", style(name).cyan()));
                }
            }
            GroupSubcommand::Member { group, member } => {
                org.add_group_member(group, member)?;
                ctx.save_org(&org)?;
                if !cli.quiet {
                    output::success(&format!(
                        "Added {} to {}",
                        style(member).cyan(),
                        style(group).cyan()
                    ));
                }
            }
            GroupSubcommand::Remove { name } => {
                org.remove_group(name)?;
                ctx.save_org(&org)?;
                if !cli.quiet {
                    output::success(&format!("Removed group {}", style(name).cyan()));
                }
            }
        }
        Ok(())
    }
}
