//! Error types for organization operations

use std::path::PathBuf;
use thiserror::Error;

use crate::container::ContainerError;
use crate::crypto::CryptoError;

/// Result type alias for organization operations
pub type Result<T> = std::result::Result<T, OrgError>;

/// Organization-related errors
#[derive(Debug, Error)]
pub enum OrgError {
    /// A member signature is missing or does not match the org public key
    #[error("Failed to verify identity of member '{member}'")]
    Verification { member: String },

    /// No member record exists for the given account id
    #[error("Member not found: {0}")]
    MemberNotFound(String),

    /// Group not found
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Vault not found
    #[error("Vault not found: {0}")]
    VaultNotFound(String),

    /// Invite not found
    #[error("Invite not found: {0}")]
    InviteNotFound(String),

    /// Key rotation needs at least one owner to hand the new keys to
    #[error("Organization has no owners to grant key access to")]
    NoOwners,

    /// A join request failed its signature checks
    #[error("Invalid join request: {0}")]
    InvalidJoinRequest(String),

    /// The decrypted key payload could not be decoded
    #[error("Invalid key payload: {0}")]
    InvalidPayload(String),

    /// Crypto provider error
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Key container error
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl OrgError {
    /// Whether this error reports a failed member identity check
    pub fn is_verification_error(&self) -> bool {
        matches!(self, OrgError::Verification { .. })
    }

    pub(crate) fn verification(member: impl Into<String>) -> Self {
        OrgError::Verification {
            member: member.into(),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_error_carries_member_name() {
        let err = OrgError::verification("Alice");
        assert!(err.is_verification_error());
        assert_eq!(err.to_string(), "Failed to verify identity of member 'Alice'");
    }

    #[test]
    fn test_other_errors_are_not_verification_errors() {
        assert!(!OrgError::MemberNotFound("bob".into()).is_verification_error());
        assert!(!OrgError::NoOwners.is_verification_error());
    }
}
