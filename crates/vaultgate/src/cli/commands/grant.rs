//! Vault assignment command

use clap::Args;
use console::style;
use tracing::info;

use crate::cli::{output, Cli};
use crate::store::Context;

/// Assign a vault to a member or group, or revoke a member's assignment
#[derive(Debug, Args)]
pub struct GrantCommand {
    /// Vault id
    #[arg(required = true)]
    pub vault: String,

    /// Member account id
    #[arg(short, long, conflicts_with = "group", required_unless_present = "group")]
    pub member: Option<String>,

    /// Group name
    #[arg(short, long)]
    pub group: Option<String>,

    /// Grant read-only access
    #[arg(long, conflicts_with = "revoke")]
    pub readonly: bool,

    /// Revoke the member's direct assignment instead
    #[arg(long, requires = "member")]
    pub revoke: bool,
}

impl GrantCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let mut org = ctx.load_org()?;

        let (target, message) = match (&self.member, &self.group) {
            (Some(member), _) if self.revoke => {
                org.revoke_member_vault(member, &self.vault)?;
                (member, "Revoked")
            }
            (Some(member), _) => {
                org.grant_member_vault(member, &self.vault, self.readonly)?;
                (member, "Granted")
            }
            (None, Some(group)) => {
                org.grant_group_vault(group, &self.vault, self.readonly)?;
                (group, "Granted")
            }
            (None, None) => anyhow::bail!("Pass --member or --group"),
        };
        ctx.save_org(&org)?;
        info!(vault = %self.vault, target = %target, revoke = self.revoke, "updated vault assignment");

        if !cli.quiet {
            let mode = if self.readonly { "read-only" } else { "read-write" };
            let detail = if self.revoke {
                String::new()
            } else {
                format!(" ({})", mode)
            };
            output::success(&format!(
                "{} {} on {}{}",
                message,
                style(target).cyan(),
                style(&self.vault).cyan(),
                detail
            ));
        }
        Ok(())
    }
}
