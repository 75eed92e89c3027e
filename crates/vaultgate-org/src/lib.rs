//! Vaultgate Org - Organization trust and access control
//!
//! This crate provides the trust root for a shared-vault organization:
//! - Organization signing keypair and invites key, protected by a key
//!   container readable only by the organization owners
//! - Mutual attestation between the organization and its members
//! - Key rotation that re-attests every member under the new key
//! - Access resolution over members, groups and vaults

pub mod account;
pub mod config;
pub mod container;
pub mod crypto;
mod encoding;
pub mod error;
pub mod org;

pub use account::{Account, AccountKeyFile, AccountPublicKey};
pub use config::Config;
pub use container::{Accessor, AgeContainer, ContainerError, KeyContainer};
pub use crypto::{CryptoError, CryptoProvider, Ed25519Provider, SignatureAlgorithm, SigningParams};
pub use error::{ConfigError, OrgError, Result};
pub use org::{
    Group, Invite, InvitePurpose, JoinRequest, Member, MemberInfo, OrgType, Organization, Role,
    UnlockedOrganization, VaultGrant, VaultRef,
};
