//! Exit codes for the CLI

use vaultgate_org::{ConfigError, ContainerError, OrgError};

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// A member identity or join request failed verification
pub const VERIFICATION_ERROR: i32 = 3;

/// Member, group, vault or invite not found
pub const NOT_FOUND: i32 = 4;

/// The account cannot unlock the organization keys, or an access check failed
pub const ACCESS_DENIED: i32 = 5;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Marker error for an aborted confirmation prompt
#[derive(Debug, thiserror::Error)]
#[error("Cancelled")]
pub struct Cancelled;

/// An access check came back negative
#[derive(Debug, thiserror::Error)]
#[error("{member} has no {mode} access to vault {vault}")]
pub struct Denied {
    pub member: String,
    pub vault: String,
    pub mode: &'static str,
}

/// Pick the exit code for a failed command
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<Cancelled>().is_some() {
        return CANCELLED;
    }
    if err.downcast_ref::<Denied>().is_some() {
        return ACCESS_DENIED;
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return CONFIG_ERROR;
    }

    match err.downcast_ref::<OrgError>() {
        Some(e) if e.is_verification_error() => VERIFICATION_ERROR,
        Some(OrgError::InvalidJoinRequest(_)) => VERIFICATION_ERROR,
        Some(OrgError::Config(_)) => CONFIG_ERROR,
        Some(
            OrgError::MemberNotFound(_)
            | OrgError::GroupNotFound(_)
            | OrgError::VaultNotFound(_)
            | OrgError::InviteNotFound(_),
        ) => NOT_FOUND,
        Some(OrgError::Container(ContainerError::NotAnAccessor(_))) => ACCESS_DENIED,
        _ => ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(
            for_error(&anyhow::Error::new(OrgError::Verification {
                member: "Bob".to_string()
            })),
            VERIFICATION_ERROR
        );
        assert_eq!(
            for_error(&anyhow::Error::new(OrgError::InvalidJoinRequest(
                "not self-signed".to_string()
            ))),
            VERIFICATION_ERROR
        );
        assert_eq!(
            for_error(&anyhow::Error::new(OrgError::VaultNotFound("v1".to_string()))),
            NOT_FOUND
        );
        assert_eq!(
            for_error(&anyhow::Error::new(OrgError::Container(
                ContainerError::NotAnAccessor("eve".to_string())
            ))),
            ACCESS_DENIED
        );
        assert_eq!(
            for_error(&anyhow::Error::new(Denied {
                member: "carol".to_string(),
                vault: "v1".to_string(),
                mode: "write",
            })),
            ACCESS_DENIED
        );
        assert_eq!(for_error(&anyhow::Error::new(Cancelled)), CANCELLED);
        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }

    #[test]
    fn test_context_keeps_exit_code() {
        let err = anyhow::Error::new(OrgError::NoOwners).context("rotating keys");
        assert_eq!(for_error(&err), ERROR);

        let err = anyhow::Error::new(OrgError::MemberNotFound("bob".to_string()))
            .context("loading member");
        assert_eq!(for_error(&err), NOT_FOUND);
    }
}
