//! CLI definition and command handling

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{
    AccessCommand, AccountCommand, CompletionsCommand, GrantCommand, GroupCommand, InviteCommand,
    MemberCommand, OrgCommand, RotateCommand, VaultCommand, VerifyCommand,
};

/// Vaultgate - Organization trust and vault access control
#[derive(Debug, Parser)]
#[command(name = "vaultgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Organization document (default: from config, then org.yaml)
    #[arg(long, global = true)]
    pub org: Option<PathBuf>,

    /// Account key file (default: from config, then ~/.vaultgate/account.yaml)
    #[arg(long, global = true)]
    pub account: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Account key management
    Account(AccountCommand),

    /// Create, inspect and join organizations
    Org(OrgCommand),

    /// Member management
    Member(MemberCommand),

    /// Verify member identities against the organization key
    Verify(VerifyCommand),

    /// Rotate the organization keys
    Rotate(RotateCommand),

    /// Vault registry
    Vault(VaultCommand),

    /// Group management
    Group(GroupCommand),

    /// Assign a vault to a member or group
    Grant(GrantCommand),

    /// Query access to vaults
    Access(AccessCommand),

    /// Invitations
    Invite(InviteCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match &self.command {
            Commands::Account(cmd) => cmd.execute(self),
            Commands::Org(cmd) => cmd.execute(self),
            Commands::Member(cmd) => cmd.execute(self),
            Commands::Verify(cmd) => cmd.execute(self),
            Commands::Rotate(cmd) => cmd.execute(self),
            Commands::Vault(cmd) => cmd.execute(self),
            Commands::Group(cmd) => cmd.execute(self),
            Commands::Grant(cmd) => cmd.execute(self),
            Commands::Access(cmd) => cmd.execute(self),
            Commands::Invite(cmd) => cmd.execute(self),
            Commands::Completions(cmd) => cmd.execute(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vaultgate",
            "rotate",
            "--force",
            "--org",
            "acme.yaml",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.org, Some(PathBuf::from("acme.yaml")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Rotate(ref cmd) if cmd.force));
    }
}
