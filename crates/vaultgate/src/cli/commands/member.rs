//! Member commands

use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use vaultgate_org::Role;

use crate::cli::{output, Cli, OutputFormat};
use crate::store::{self, Context};

/// Member management commands
#[derive(Debug, Args)]
pub struct MemberCommand {
    #[command(subcommand)]
    pub command: MemberSubcommand,
}

/// Member subcommands
#[derive(Debug, Subcommand)]
pub enum MemberSubcommand {
    /// List all members
    List(MemberListCommand),
    /// Accept a join request and sign the member
    Add(MemberAddCommand),
    /// Remove a member
    Remove(MemberRemoveCommand),
}

/// List members
#[derive(Debug, Args)]
pub struct MemberListCommand {}

/// Accept a join request
#[derive(Debug, Args)]
pub struct MemberAddCommand {
    /// Join request file produced by `vaultgate org join`
    #[arg(required = true)]
    pub request: PathBuf,

    /// Role (owner, admin, member, suspended); existing members keep theirs by default
    #[arg(short, long)]
    pub role: Option<Role>,
}

/// Remove a member
#[derive(Debug, Args)]
pub struct MemberRemoveCommand {
    /// Member account id
    #[arg(required = true)]
    pub id: String,
}

impl MemberCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            MemberSubcommand::List(cmd) => cmd.execute(cli),
            MemberSubcommand::Add(cmd) => cmd.execute(cli),
            MemberSubcommand::Remove(cmd) => cmd.execute(cli),
        }
    }
}

impl MemberListCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let org = ctx.load_org()?;

        match cli.format {
            OutputFormat::Json => {
                let members: Vec<_> = org
                    .members
                    .iter()
                    .map(|m| {
                        serde_json::json!({
                            "id": m.id,
                            "name": m.name,
                            "email": m.email,
                            "role": m.role,
                            "signed": m.signature.is_some(),
                            "fingerprint": m.public_key.fingerprint(),
                            "groups": org
                                .get_groups_for_member(&m.id)
                                .iter()
                                .map(|g| g.name.as_str())
                                .collect::<Vec<_>>(),
                            "vaults": m.vaults,
                        })
                    })
                    .collect();
                output::json(&members)?;
            }
            OutputFormat::Text => {
                println!("{}", output::header("Members"));
                println!();

                for member in &org.members {
                    println!(
                        "  {} <{}> [{}]",
                        style(&member.name).cyan(),
                        member.email,
                        output::role_style(member.role)
                    );
                    if cli.verbose {
                        println!("    Id:          {}", member.id);
                        println!(
                            "    Fingerprint: {}",
                            style(member.public_key.fingerprint()).dim()
                        );
                        println!("    Vaults:      {}", member.vaults.len());
                    }
                }
            }
        }
        Ok(())
    }
}

impl MemberAddCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let request = store::load_request(&self.request)?;
        let mut org = ctx.load_org()?;

        let Some(org_public_key) = org.public_key.as_deref() else {
            bail!("Organization {} has not been initialized", org.name);
        };
        request.verify(&org.id, org_public_key)?;

        let mut member_info = request.member;
        if self.role.is_some() {
            member_info.role = self.role;
        }

        let account = ctx.load_account()?;
        let member = {
            let mut unlocked = ctx.unlock(&mut org, &account).await?;
            let member = unlocked.add_or_update_member(member_info).await?.clone();
            unlocked.lock();
            member
        };
        ctx.save_org(&org)?;
        info!(member = %member.id, role = %member.role, "member signed");

        match cli.format {
            OutputFormat::Json => output::json(&member)?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "Signed {} as {}",
                        style(&member.email).cyan(),
                        output::role_style(member.role)
                    ));
                }
            }
        }
        Ok(())
    }
}

impl MemberRemoveCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let mut org = ctx.load_org()?;

        let removed = org.remove_member(&self.id)?;
        ctx.save_org(&org)?;

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "removed": removed.id,
                "role": removed.role,
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!("Removed {}", style(&removed.email).cyan()));
                }
                if removed.role == Role::Owner {
                    output::warning(
                        "Removed an owner. They can still unlock the organization keys until you run `vaultgate rotate`.",
                    );
                }
            }
        }
        Ok(())
    }
}
