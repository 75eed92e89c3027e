//! Member roles

use serde::{Deserialize, Serialize};

/// Role of a member within an organization.
///
/// Roles are totally ordered by privilege: `Owner` is the most privileged,
/// `Suspended` the least. The discriminant is the byte bound into member
/// signatures and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    /// Holds the organization keys, full control
    Owner = 0,
    /// Manages members, groups and vault assignments
    Admin = 1,
    /// Regular member, access through vault assignments only
    Member = 2,
    /// Identity pending re-confirmation, no write access
    Suspended = 3,
}

impl Role {
    /// The stable byte used inside signed member data
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Decode a role byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Role::Owner),
            1 => Some(Role::Admin),
            2 => Some(Role::Member),
            3 => Some(Role::Suspended),
            _ => None,
        }
    }

    /// Whether this role grants at least the privileges of `required`
    pub fn has_privilege_of(self, required: Role) -> bool {
        self.as_byte() <= required.as_byte()
    }

    /// Get the display name for this role
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Admin => "Admin",
            Role::Member => "Member",
            Role::Suspended => "Suspended",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "suspended" => Ok(Role::Suspended),
            _ => Err(format!(
                "Unknown role: {}. Valid roles: owner, admin, member, suspended",
                s
            )),
        }
    }
}
