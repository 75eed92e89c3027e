//! Core types for the organization registry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::roles::Role;
use crate::account::AccountPublicKey;
use crate::encoding::{base64_serde, option_base64_serde};

/// Organization tier, persisted as its ordinal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrgType {
    /// Basic tier
    #[default]
    Basic,
    /// Team tier
    Team,
    /// Business tier
    Business,
}

impl OrgType {
    /// Tier ordinal
    pub fn ordinal(self) -> u8 {
        match self {
            OrgType::Basic => 0,
            OrgType::Team => 1,
            OrgType::Business => 2,
        }
    }
}

impl From<OrgType> for u8 {
    fn from(org_type: OrgType) -> u8 {
        org_type.ordinal()
    }
}

impl TryFrom<u8> for OrgType {
    type Error = String;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        match ordinal {
            0 => Ok(OrgType::Basic),
            1 => Ok(OrgType::Team),
            2 => Ok(OrgType::Business),
            _ => Err(format!("Unknown organization type: {}", ordinal)),
        }
    }
}

impl std::fmt::Display for OrgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrgType::Basic => write!(f, "basic"),
            OrgType::Team => write!(f, "team"),
            OrgType::Business => write!(f, "business"),
        }
    }
}

/// Usage limits attached to the organization. Bookkeeping happens elsewhere;
/// `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgQuota {
    pub members: i64,
    pub groups: i64,
    pub vaults: i64,
    pub storage: i64,
}

impl Default for OrgQuota {
    fn default() -> Self {
        Self {
            members: -1,
            groups: -1,
            vaults: -1,
            storage: -1,
        }
    }
}

/// Vault enumeration entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRef {
    /// Vault id
    pub id: String,
    /// Vault name
    pub name: String,
}

/// A vault assignment on a member or group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultGrant {
    /// Vault id
    pub id: String,
    /// Read-only access
    #[serde(default)]
    pub readonly: bool,
}

impl VaultGrant {
    /// Create a grant
    pub fn new(id: impl Into<String>, readonly: bool) -> Self {
        Self {
            id: id.into(),
            readonly,
        }
    }
}

/// A member of an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Account id
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Account public key
    pub public_key: AccountPublicKey,

    /// The organization's attestation of this member's identity
    #[serde(default, with = "option_base64_serde")]
    pub signature: Option<Vec<u8>>,

    /// The member's attestation of the organization's identity
    #[serde(with = "base64_serde")]
    pub org_signature: Vec<u8>,

    /// Member's role
    pub role: Role,

    /// Direct vault assignments
    #[serde(default)]
    pub vaults: Vec<VaultGrant>,

    /// Last time the identity fields changed
    pub updated: DateTime<Utc>,
}

impl Member {
    /// Build an unsigned member from identity info
    pub fn from_info(info: MemberInfo) -> Self {
        Self {
            id: info.id,
            name: info.name,
            email: info.email,
            public_key: info.public_key,
            signature: None,
            org_signature: info.org_signature,
            role: info.role.unwrap_or(Role::Member),
            vaults: Vec::new(),
            updated: Utc::now(),
        }
    }

    /// Whether this member is suspended
    pub fn is_suspended(&self) -> bool {
        self.role == Role::Suspended
    }

    /// Direct grant for a vault, if any
    pub fn vault_grant(&self, vault_id: &str) -> Option<&VaultGrant> {
        self.vaults.iter().find(|v| v.id == vault_id)
    }
}

/// Identity fields used to create or update a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Account id
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Account public key
    pub public_key: AccountPublicKey,
    /// The account's signature over the org identity
    #[serde(with = "base64_serde")]
    pub org_signature: Vec<u8>,
    /// Role; `None` keeps the current role (or `Member` for new members)
    #[serde(default)]
    pub role: Option<Role>,
}

/// A named bundle of members and vault assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group name (unique within the organization)
    pub name: String,

    /// Member account ids
    #[serde(default)]
    pub members: Vec<String>,

    /// Vault assignments
    #[serde(default)]
    pub vaults: Vec<VaultGrant>,
}

impl Group {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            vaults: Vec::new(),
        }
    }

    /// Whether the given account id is listed in this group
    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m == member_id)
    }

    /// Grant for a vault, if any
    pub fn vault_grant(&self, vault_id: &str) -> Option<&VaultGrant> {
        self.vaults.iter().find(|v| v.id == vault_id)
    }
}
