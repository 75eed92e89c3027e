//! Organizations, members and access resolution
//!
//! An [`Organization`] is the trust root for a set of members, groups and
//! vaults. It is always handled in one of two states:
//!
//! - locked ([`Organization`]): registries and the public key only; the
//!   access resolver and group/vault bookkeeping work here
//! - unlocked ([`UnlockedOrganization`]): additionally holds the decrypted
//!   signing key and invites key, needed to sign, verify and rotate

mod access;
mod invite;
mod join;
mod lifecycle;
mod organization;
mod roles;
mod signature;
mod types;

pub use invite::{Invite, InvitePurpose};
pub use join::JoinRequest;
pub use lifecycle::UnlockedOrganization;
pub use organization::Organization;
pub use roles::Role;
pub use signature::{member_message, org_identity_message, sign_member, verify_member};
pub use types::{Group, Member, MemberInfo, OrgQuota, OrgType, VaultGrant, VaultRef};
