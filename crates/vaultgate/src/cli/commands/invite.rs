//! Invite commands

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use vaultgate_org::{InvitePurpose, OrgError};

use crate::cli::{output, Cli, OutputFormat};
use crate::store::Context;

/// Invite commands
#[derive(Debug, Args)]
pub struct InviteCommand {
    #[command(subcommand)]
    pub command: InviteSubcommand,
}

/// Invite subcommands
#[derive(Debug, Subcommand)]
pub enum InviteSubcommand {
    /// Create an invite and print its secret
    Create {
        /// Invitee email
        email: String,

        /// Ask an existing member to re-confirm their identity
        #[arg(long)]
        confirm: bool,
    },

    /// Show an invite's secret
    Show {
        /// Invite id
        id: String,
    },

    /// List pending invites
    List,

    /// Remove an invite
    Remove {
        /// Invite id
        id: String,
    },
}

impl InviteCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            InviteSubcommand::Create { email, confirm } => {
                let purpose = if *confirm {
                    InvitePurpose::ConfirmMembership
                } else {
                    InvitePurpose::Join
                };
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(self.create(cli, email, purpose))
            }
            InviteSubcommand::Show { id } => {
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(self.show(cli, id))
            }
            InviteSubcommand::List => self.list(cli),
            InviteSubcommand::Remove { id } => {
                let ctx = Context::from_cli(cli)?;
                let mut org = ctx.load_org()?;
                let invite = org.remove_invite(id)?;
                ctx.save_org(&org)?;
                if !cli.quiet {
                    output::success(&format!("Removed invite for {}", style(&invite.email).cyan()));
                }
                Ok(())
            }
        }
    }

    async fn create(&self, cli: &Cli, email: &str, purpose: InvitePurpose) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let account = ctx.load_account()?;
        let mut org = ctx.load_org()?;

        let view = {
            let mut unlocked = ctx.unlock(&mut org, &account).await?;
            let view = invite_view(unlocked.create_invite(email, purpose)?)?;
            unlocked.lock();
            view
        };
        ctx.save_org(&org)?;
        info!(invite = %view.id, purpose = %purpose, "created invite");

        print_invite(cli, &view)?;
        if cli.format == OutputFormat::Text && !cli.quiet {
            output::info("Share the secret with the invitee over a separate channel");
        }
        Ok(())
    }

    async fn show(&self, cli: &Cli, id: &str) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let account = ctx.load_account()?;
        let mut org = ctx.load_org()?;

        let view = {
            let mut unlocked = ctx.unlock(&mut org, &account).await?;
            let view = invite_view(unlocked.open_invite(id)?)?;
            unlocked.lock();
            view
        };

        print_invite(cli, &view)?;
        if view.expired && cli.format == OutputFormat::Text {
            output::warning("This invite has expired");
        }
        Ok(())
    }

    fn list(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let org = ctx.load_org()?;

        match cli.format {
            OutputFormat::Json => output::json(&org.invites)?,
            OutputFormat::Text => {
                println!("{}", output::header("Invites"));
                println!();
                for invite in &org.invites {
                    let status = if invite.is_expired() {
                        style("expired").red()
                    } else {
                        style("pending").green()
                    };
                    println!(
                        "  {} {} ({}, {}) expires {}",
                        style(&invite.email).cyan(),
                        style(&invite.id).dim(),
                        invite.purpose,
                        status,
                        invite.expires.format("%Y-%m-%d %H:%M UTC")
                    );
                }
            }
        }
        Ok(())
    }
}

fn print_invite(cli: &Cli, invite: &InviteView) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => output::json(invite)?,
        OutputFormat::Text => {
            println!("{}", output::key_value("Invite", &invite.id));
            println!("{}", output::key_value("Email", &invite.email));
            println!("{}", output::key_value("Purpose", &invite.purpose.to_string()));
            println!("{}", output::key_value("Expires", &invite.expires));
            println!(
                "{}",
                output::key_value("Secret", &style(&invite.secret).bold().to_string())
            );
        }
    }
    Ok(())
}

/// Printable invite including the decrypted secret
#[derive(Debug, serde::Serialize)]
struct InviteView {
    id: String,
    email: String,
    purpose: InvitePurpose,
    expires: String,
    expired: bool,
    secret: String,
}

fn invite_view(invite: &vaultgate_org::Invite) -> anyhow::Result<InviteView> {
    let secret = invite
        .secret()
        .ok_or_else(|| OrgError::InviteNotFound(invite.id.clone()))?;
    Ok(InviteView {
        id: invite.id.clone(),
        email: invite.email.clone(),
        purpose: invite.purpose,
        expires: invite.expires.to_rfc3339(),
        expired: invite.is_expired(),
        secret: secret.to_string(),
    })
}
