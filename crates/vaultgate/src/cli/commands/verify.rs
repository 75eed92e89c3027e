//! Verify member identities

use clap::Args;
use console::style;
use tracing::{info, warn};

use vaultgate_org::org::verify_member;
use vaultgate_org::{Member, OrgError};

use crate::cli::{output, Cli, OutputFormat};
use crate::store::Context;

/// Verify members against the organization public key.
///
/// Only the public key is needed, so any holder of the organization document
/// can run this.
#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// Verify a single member (suspended members included)
    #[arg(short, long)]
    pub member: Option<String>,
}

impl VerifyCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli))
    }

    async fn execute_async(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_cli(cli)?;
        let org = ctx.load_org()?;
        let Some(public_key) = org.public_key.as_deref() else {
            anyhow::bail!("Organization {} has not been initialized", org.name);
        };

        let targets: Vec<&Member> = match &self.member {
            Some(id) => vec![org
                .get_member(id)
                .ok_or_else(|| OrgError::MemberNotFound(id.clone()))?],
            None => org.members.iter().filter(|m| !m.is_suspended()).collect(),
        };

        let provider = ctx.provider();
        let mut results = Vec::with_capacity(targets.len());
        for member in &targets {
            let result =
                verify_member(provider.as_ref(), public_key, &org.signing_params, member).await;
            if let Err(e) = &result {
                warn!(member = %member.id, error = %e, "verification failed");
            }
            results.push((*member, result));
        }

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(checked = results.len(), failed, "verification finished");

        match cli.format {
            OutputFormat::Json => {
                let report: Vec<_> = results
                    .iter()
                    .map(|(m, r)| {
                        serde_json::json!({
                            "id": m.id,
                            "name": m.name,
                            "verified": r.is_ok(),
                            "error": r.as_ref().err().map(|e| e.to_string()),
                        })
                    })
                    .collect();
                output::json(&report)?;
            }
            OutputFormat::Text => {
                for (member, result) in &results {
                    match result {
                        Ok(()) if cli.verbose || self.member.is_some() => println!(
                            "  {} {} [{}]",
                            style("✓").green(),
                            member.name,
                            output::role_style(member.role)
                        ),
                        Ok(()) => {}
                        Err(e) => println!("  {} {}: {}", style("✗").red(), member.name, e),
                    }
                }
                if failed == 0 && !cli.quiet {
                    output::success(&format!("{} member(s) verified", results.len()));
                }
            }
        }

        match results.into_iter().find_map(|(_, r)| r.err()) {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
