//! Organization commands

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Args, Subcommand, ValueEnum};
use console::style;
use tracing::info;

use vaultgate_org::{AgeContainer, JoinRequest, KeyContainer, OrgType, Organization, Role};

use crate::cli::{output, Cli, OutputFormat};
use crate::store::{self, Context};

/// Organization commands
#[derive(Debug, Args)]
pub struct OrgCommand {
    #[command(subcommand)]
    pub command: OrgSubcommand,
}

/// Organization subcommands
#[derive(Debug, Subcommand)]
pub enum OrgSubcommand {
    /// Create a new organization owned by the configured account
    Init(OrgInitCommand),

    /// Show organization status
    Status(OrgStatusCommand),

    /// Produce a join request for the configured account
    Join(OrgJoinCommand),
}

/// Organization tier
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrgTypeArg {
    /// Basic tier
    Basic,
    /// Team tier
    Team,
    /// Business tier
    Business,
}

impl From<OrgTypeArg> for OrgType {
    fn from(arg: OrgTypeArg) -> Self {
        match arg {
            OrgTypeArg::Basic => OrgType::Basic,
            OrgTypeArg::Team => OrgType::Team,
            OrgTypeArg::Business => OrgType::Business,
        }
    }
}

/// Create an organization
#[derive(Debug, Args)]
pub struct OrgInitCommand {
    /// Organization name
    #[arg(required = true)]
    pub name: String,

    /// Organization tier
    #[arg(long = "type", value_enum, default_value = "basic")]
    pub org_type: OrgTypeArg,

    /// Overwrite an existing organization document
    #[arg(long)]
    pub force: bool,
}

/// Show organization status
#[derive(Debug, Args)]
pub struct OrgStatusCommand {}

/// Produce a join request
#[derive(Debug, Args)]
pub struct OrgJoinCommand {
    /// Where to write the request
    #[arg(short, long, required = true)]
    pub output: PathBuf,
}

impl OrgCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let subcommand_name = match &self.command {
            OrgSubcommand::Init(_) => "init",
            OrgSubcommand::Status(_) => "status",
            OrgSubcommand::Join(_) => "join",
        };
        info!(subcommand = subcommand_name, "executing org command");
        match &self.command {
            OrgSubcommand::Init(cmd) => cmd.execute(cli),
            OrgSubcommand::Status(cmd) => cmd.execute(cli),
            OrgSubcommand::Join(cmd) => cmd.execute(cli),
        }
    }
}

impl OrgInitCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        if ctx.document.exists() && !self.force {
            bail!(
                "Organization document {} already exists (use --force to overwrite)",
                ctx.document.display()
            );
        }
        let account = ctx.load_account()?;

        let mut org = Organization::new(
            &self.name,
            &account.id,
            self.org_type.into(),
            AgeContainer::new(),
        );
        org.signing_params = ctx.config.signing_params();

        org.initialize(&account, ctx.provider())
            .await
            .context("Failed to initialize organization")?
            .lock();
        ctx.save_org(&org)?;

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "id": org.id,
                "name": org.name,
                "document": ctx.document.to_string_lossy(),
                "fingerprint": org.fingerprint(),
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "Organization {} created",
                        style(&org.name).cyan()
                    ));
                    println!("{}", output::key_value("Id", &org.id));
                    println!("{}", output::key_value("Document", &ctx.document.display().to_string()));
                    println!(
                        "{}",
                        output::key_value("Fingerprint", &org.fingerprint().unwrap_or_default())
                    );
                    println!("{}", output::key_value("Owner", &account.id));
                }
            }
        }
        Ok(())
    }
}

impl OrgStatusCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let org = ctx.load_org()?;

        let count_role = |role: Role| org.members.iter().filter(|m| m.role == role).count();
        let pending_invites = org.invites.iter().filter(|i| !i.is_expired()).count();

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "id": org.id,
                "name": org.name,
                "type": org.org_type.to_string(),
                "revision": org.revision,
                "fingerprint": org.fingerprint(),
                "members": org.members.len(),
                "owners": count_role(Role::Owner),
                "suspended": count_role(Role::Suspended),
                "groups": org.groups.len(),
                "vaults": org.vaults.len(),
                "pending_invites": pending_invites,
                "key_accessors": org.container.accessors().len(),
                "updated": org.updated.to_rfc3339(),
            }))?,
            OutputFormat::Text => {
                println!("{}", output::header("Organization Status"));
                println!();
                println!("  Name:        {}", style(&org.name).cyan());
                println!("  Id:          {}", org.id);
                println!("  Type:        {}", org.org_type);
                println!(
                    "  Fingerprint: {}",
                    org.fingerprint()
                        .unwrap_or_else(|| style("not initialized").yellow().to_string())
                );
                println!(
                    "  Members:     {} ({} owners, {} suspended)",
                    org.members.len(),
                    count_role(Role::Owner),
                    count_role(Role::Suspended)
                );
                println!("  Groups:      {}", org.groups.len());
                println!("  Vaults:      {}", org.vaults.len());
                println!("  Invites:     {} pending", pending_invites);
                if cli.verbose {
                    println!("  Revision:    {}", style(&org.revision).dim());
                    println!("  Updated:     {}", org.updated.to_rfc3339());
                }
            }
        }
        Ok(())
    }
}

impl OrgJoinCommand {
    fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let account = ctx.load_account()?;
        let org = ctx.load_org()?;

        let Some(public_key) = org.public_key.as_deref() else {
            bail!("Organization {} has not been initialized", org.name);
        };

        let request = JoinRequest::new(&account, &org.id, public_key);
        store::save_request(&self.output, &request)?;
        info!(org = %org.id, account = %account.id, "wrote join request");

        match cli.format {
            OutputFormat::Json => output::json(&serde_json::json!({
                "request": self.output.to_string_lossy(),
                "org": org.id,
                "fingerprint": org.fingerprint(),
            }))?,
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!("Join request written to {}", self.output.display()));
                    output::info(&format!(
                        "You attested organization {} with fingerprint {}",
                        style(&org.name).cyan(),
                        style(org.fingerprint().unwrap_or_default()).green()
                    ));
                    println!("  Confirm this fingerprint with an owner before sending the request.");
                }
            }
        }
        Ok(())
    }
}
