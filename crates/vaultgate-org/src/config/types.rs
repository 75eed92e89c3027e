//! Configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults::{
    ACCOUNT_KEY_FILE_ENV, DEFAULT_CONCURRENCY, DEFAULT_DOCUMENT, DEFAULT_INVITE_TTL_HOURS,
};
use crate::crypto::{SignatureAlgorithm, SigningParams};

/// Main configuration for vaultgate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Organization document settings
    pub org: OrgConfig,

    /// Signing settings
    pub crypto: CryptoConfig,

    /// Invite settings
    pub invites: InviteConfig,

    /// Local account settings
    pub account: AccountConfig,
}

impl Config {
    /// Signing parameters for new organizations
    pub fn signing_params(&self) -> SigningParams {
        SigningParams::new(self.crypto.algorithm)
    }

    /// Lifetime of newly created invites
    pub fn invite_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.invites.ttl_hours))
    }

    /// Account key file, with the environment taking precedence
    pub fn account_key_file(&self) -> Option<PathBuf> {
        std::env::var_os(ACCOUNT_KEY_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.account.key_file.clone())
    }
}

/// Organization document configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgConfig {
    /// Path of the YAML organization document
    pub document: PathBuf,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            document: PathBuf::from(DEFAULT_DOCUMENT),
        }
    }
}

/// Signing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Signature algorithm for member attestations
    pub algorithm: SignatureAlgorithm,

    /// Maximum signatures verified or produced concurrently
    pub concurrency: usize,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            algorithm: SignatureAlgorithm::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Invite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteConfig {
    /// Hours before an invite expires
    pub ttl_hours: u32,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_INVITE_TTL_HOURS,
        }
    }
}

/// Local account configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Path of the account key file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.org.document, PathBuf::from("org.yaml"));
        assert_eq!(config.crypto.concurrency, 8);
        assert_eq!(config.crypto.algorithm, SignatureAlgorithm::Ed25519);
        assert_eq!(config.invite_ttl(), chrono::Duration::hours(168));
        assert!(config.account.key_file.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[crypto]\nconcurrency = 2\n").unwrap();
        assert_eq!(config.crypto.concurrency, 2);
        assert_eq!(config.crypto.algorithm, SignatureAlgorithm::Ed25519);
        assert_eq!(config.invites.ttl_hours, 168);
    }
}
