//! The organization record

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::invite::Invite;
use super::lifecycle::{generate_secrets, OrgSecrets, UnlockedOrganization};
use super::roles::Role;
use super::types::{Group, Member, MemberInfo, OrgQuota, OrgType, VaultGrant, VaultRef};
use crate::account::Account;
use crate::container::{AgeContainer, KeyContainer};
use crate::crypto::{CryptoProvider, SigningParams};
use crate::encoding::{fingerprint, option_base64_serde};
use crate::error::{OrgError, Result};

/// An organization in its locked state.
///
/// The serde form of this struct is the public record: it carries the public
/// signing key, the registries and the key container, but never the private
/// signing key or the invites key. Those are only reachable through
/// [`UnlockedOrganization`], obtained from [`Organization::unlock`] or
/// [`Organization::initialize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization<C: KeyContainer = AgeContainer> {
    /// Organization id
    pub id: String,

    /// Tier
    #[serde(rename = "type", default)]
    pub org_type: OrgType,

    /// Account id of the creating owner
    pub owner: String,

    /// Display name
    pub name: String,

    /// Public signing key
    #[serde(default, with = "option_base64_serde")]
    pub public_key: Option<Vec<u8>>,

    /// Parameters used for all member signatures
    #[serde(default)]
    pub signing_params: SigningParams,

    /// Members, in insertion order
    #[serde(default)]
    pub members: Vec<Member>,

    /// Groups
    #[serde(default)]
    pub groups: Vec<Group>,

    /// Vaults owned by the organization
    #[serde(default)]
    pub vaults: Vec<VaultRef>,

    /// Pending invitations
    #[serde(default)]
    pub invites: Vec<Invite>,

    /// Changes on every mutation
    pub revision: String,

    /// Usage limits
    #[serde(default)]
    pub quota: OrgQuota,

    /// Opaque billing info
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<serde_json::Value>,

    /// Creation time
    pub created: DateTime<Utc>,

    /// Last modification time
    pub updated: DateTime<Utc>,

    /// Container protecting the private keys
    pub container: C,
}

impl<C: KeyContainer> Organization<C> {
    /// Create an empty, uninitialized organization
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        org_type: OrgType,
        container: C,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            org_type,
            owner: owner.into(),
            name: name.into(),
            public_key: None,
            signing_params: SigningParams::default(),
            members: Vec::new(),
            groups: Vec::new(),
            vaults: Vec::new(),
            invites: Vec::new(),
            revision: Uuid::new_v4().to_string(),
            quota: OrgQuota::default(),
            billing: None,
            created: now,
            updated: now,
            container,
        }
    }

    /// Short fingerprint of the public signing key
    pub fn fingerprint(&self) -> Option<String> {
        self.public_key.as_deref().map(fingerprint)
    }

    /// Bump the revision token and modification time
    pub(crate) fn touch(&mut self) {
        self.revision = Uuid::new_v4().to_string();
        self.updated = Utc::now();
    }

    /// Set up the keys of a fresh organization and register `account` as its
    /// first owner.
    ///
    /// Must be called exactly once per organization.
    #[instrument(skip_all, fields(org = %self.id, account = %account.id))]
    pub async fn initialize(
        &mut self,
        account: &Account,
        provider: Arc<dyn CryptoProvider>,
    ) -> Result<UnlockedOrganization<'_, C>> {
        self.container
            .update_accessors(vec![account.accessor()])
            .await?;

        let (public_key, secrets) = generate_secrets(provider.as_ref(), &self.signing_params).await?;
        self.container.set_data(&secrets.encode()?).await?;
        let org_signature = account.sign_org(&self.id, &public_key);
        self.public_key = Some(public_key);
        self.owner = account.id.clone();

        let mut unlocked = UnlockedOrganization::new(self, secrets, provider);
        unlocked
            .add_or_update_member(MemberInfo {
                id: account.id.clone(),
                name: account.name.clone(),
                email: account.email.clone(),
                public_key: account.public_key(),
                org_signature,
                role: Some(Role::Owner),
            })
            .await?;

        info!(name = %unlocked.name, "initialized organization");
        Ok(unlocked)
    }

    /// Unlock the organization keys as `account`
    #[instrument(skip_all, fields(org = %self.id, account = %account.id))]
    pub async fn unlock(
        &mut self,
        account: &Account,
        provider: Arc<dyn CryptoProvider>,
    ) -> Result<UnlockedOrganization<'_, C>> {
        self.container.unlock(account).await?;

        let secrets = match self.container.get_data().await {
            Ok(data) => OrgSecrets::decode(&data),
            Err(e) => Err(e.into()),
        };
        let secrets = match secrets {
            Ok(secrets) => secrets,
            Err(e) => {
                self.container.lock();
                return Err(e);
            }
        };

        debug!("unlocked organization");
        Ok(UnlockedOrganization::new(self, secrets, provider))
    }

    /// Register a vault. Replaces the name if the id is already known.
    pub fn add_vault(&mut self, id: impl Into<String>, name: impl Into<String>) {
        let id = id.into();
        let name = name.into();
        match self.vaults.iter_mut().find(|v| v.id == id) {
            Some(vault) => vault.name = name,
            None => self.vaults.push(VaultRef { id, name }),
        }
        self.touch();
    }

    /// Remove a vault and every grant referencing it
    pub fn remove_vault(&mut self, vault_id: &str) -> Result<VaultRef> {
        let idx = self
            .vaults
            .iter()
            .position(|v| v.id == vault_id)
            .ok_or_else(|| OrgError::VaultNotFound(vault_id.to_string()))?;
        let vault = self.vaults.remove(idx);

        for member in &mut self.members {
            member.vaults.retain(|g| g.id != vault_id);
        }
        for group in &mut self.groups {
            group.vaults.retain(|g| g.id != vault_id);
        }

        self.touch();
        info!(vault = %vault.id, "removed vault");
        Ok(vault)
    }

    /// Insert a group, replacing any group with the same name
    pub fn put_group(&mut self, group: Group) {
        match self.groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
        self.touch();
    }

    /// Remove a group by name
    pub fn remove_group(&mut self, name: &str) -> Result<Group> {
        let idx = self
            .groups
            .iter()
            .position(|g| g.name == name)
            .ok_or_else(|| OrgError::GroupNotFound(name.to_string()))?;
        let group = self.groups.remove(idx);
        self.touch();
        Ok(group)
    }

    /// Add a member id to a group. Adding an existing entry is a no-op.
    pub fn add_group_member(&mut self, group_name: &str, member_id: &str) -> Result<()> {
        if !self.members.iter().any(|m| m.id == member_id) {
            return Err(OrgError::MemberNotFound(member_id.to_string()));
        }
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.name == group_name)
            .ok_or_else(|| OrgError::GroupNotFound(group_name.to_string()))?;

        if !group.has_member(member_id) {
            group.members.push(member_id.to_string());
        }
        self.touch();
        Ok(())
    }

    /// Assign a vault to a member directly
    pub fn grant_member_vault(&mut self, member_id: &str, vault_id: &str, readonly: bool) -> Result<()> {
        self.ensure_vault(vault_id)?;
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| OrgError::MemberNotFound(member_id.to_string()))?;

        upsert_grant(&mut member.vaults, vault_id, readonly);
        self.touch();
        Ok(())
    }

    /// Assign a vault to a group
    pub fn grant_group_vault(&mut self, group_name: &str, vault_id: &str, readonly: bool) -> Result<()> {
        self.ensure_vault(vault_id)?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.name == group_name)
            .ok_or_else(|| OrgError::GroupNotFound(group_name.to_string()))?;

        upsert_grant(&mut group.vaults, vault_id, readonly);
        self.touch();
        Ok(())
    }

    /// Drop a member's direct assignment of a vault
    pub fn revoke_member_vault(&mut self, member_id: &str, vault_id: &str) -> Result<()> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| OrgError::MemberNotFound(member_id.to_string()))?;

        member.vaults.retain(|g| g.id != vault_id);
        self.touch();
        Ok(())
    }

    /// Remove a member and drop it from every group.
    ///
    /// A removed owner keeps access to the key container until the keys are
    /// rotated.
    #[instrument(skip_all, fields(org = %self.id, member = member_id))]
    pub fn remove_member(&mut self, member_id: &str) -> Result<Member> {
        let idx = self
            .members
            .iter()
            .position(|m| m.id == member_id)
            .ok_or_else(|| OrgError::MemberNotFound(member_id.to_string()))?;
        let member = self.members.remove(idx);

        for group in &mut self.groups {
            group.members.retain(|id| id != member_id);
        }

        if member.role == Role::Owner {
            warn!("removed an owner; they keep key access until the keys are rotated");
        }
        self.touch();
        info!("removed member");
        Ok(member)
    }

    /// Look up a pending invite
    pub fn get_invite(&self, id: &str) -> Option<&Invite> {
        self.invites.iter().find(|i| i.id == id)
    }

    /// Remove a pending invite
    pub fn remove_invite(&mut self, id: &str) -> Result<Invite> {
        let idx = self
            .invites
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| OrgError::InviteNotFound(id.to_string()))?;
        let invite = self.invites.remove(idx);
        self.touch();
        Ok(invite)
    }

    fn ensure_vault(&self, vault_id: &str) -> Result<()> {
        if self.vaults.iter().any(|v| v.id == vault_id) {
            Ok(())
        } else {
            Err(OrgError::VaultNotFound(vault_id.to_string()))
        }
    }
}

fn upsert_grant(grants: &mut Vec<VaultGrant>, vault_id: &str, readonly: bool) {
    match grants.iter_mut().find(|g| g.id == vault_id) {
        Some(grant) => grant.readonly = readonly,
        None => grants.push(VaultGrant::new(vault_id, readonly)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Ed25519Provider;
    use crate::org::InvitePurpose;

    fn provider() -> Arc<dyn CryptoProvider> {
        Arc::new(Ed25519Provider::new())
    }

    fn org() -> Organization {
        Organization::new("Acme", "", OrgType::Team, AgeContainer::new())
    }

    #[tokio::test]
    async fn test_initialize_registers_owner() {
        let owner = Account::generate("alice", "Alice", "alice@example.com");
        let mut org = org();
        let unlocked = org.initialize(&owner, provider()).await.unwrap();

        assert_eq!(unlocked.owner, "alice");
        assert_eq!(unlocked.members.len(), 1);
        assert_eq!(unlocked.members[0].role, Role::Owner);
        unlocked.verify(&unlocked.members[0]).await.unwrap();

        let public_key = unlocked.public_key.clone().unwrap();
        assert!(owner
            .public_key()
            .verify_org_signature(&unlocked.id, &public_key, &unlocked.members[0].org_signature)
            .unwrap());
        unlocked.lock();

        assert!(!org.container.is_unlocked());
        assert_eq!(org.container.accessors().len(), 1);
    }

    #[tokio::test]
    async fn test_public_record_has_no_secrets() {
        let owner = Account::generate("alice", "Alice", "alice@example.com");
        let mut org = org();
        let mut unlocked = org.initialize(&owner, provider()).await.unwrap();
        let private_key = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            unlocked.private_key().expose(),
        );
        let invite_secret = unlocked
            .create_invite("bob@example.com", InvitePurpose::Join)
            .unwrap()
            .secret()
            .unwrap()
            .to_string();
        unlocked.lock();

        org.add_vault("v1", "Engineering");
        org.put_group(Group::new("devs"));
        org.add_group_member("devs", "alice").unwrap();
        org.grant_group_vault("devs", "v1", true).unwrap();
        org.quota.members = 25;
        org.billing = Some(serde_json::json!({"plan": "team", "seats": 25}));

        let yaml = serde_yaml::to_string(&org).unwrap();
        assert!(!yaml.contains(&private_key));
        assert!(!yaml.contains(&invite_secret));
        assert!(yaml.contains("encrypted_data"));

        let mut restored: Organization = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored.id, org.id);
        assert_eq!(restored.name, org.name);
        assert_eq!(restored.owner, org.owner);
        assert_eq!(restored.org_type, OrgType::Team);
        assert_eq!(restored.revision, org.revision);
        assert_eq!(restored.public_key, org.public_key);
        assert_eq!(restored.signing_params, org.signing_params);
        assert_eq!(restored.members, org.members);
        assert_eq!(restored.groups, org.groups);
        assert_eq!(restored.vaults, org.vaults);
        assert_eq!(restored.quota, org.quota);
        assert_eq!(restored.billing, org.billing);
        assert_eq!(restored.created, org.created);
        assert_eq!(restored.updated, org.updated);
        assert_eq!(restored.container.accessors(), org.container.accessors());
        assert_eq!(restored.invites.len(), 1);
        assert_eq!(restored.invites[0].id, org.invites[0].id);
        assert_eq!(restored.invites[0].email, org.invites[0].email);
        assert_eq!(restored.invites[0].expires, org.invites[0].expires);

        let mut unlocked = restored.unlock(&owner, provider()).await.unwrap();
        assert_eq!(
            base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                unlocked.private_key().expose()
            ),
            private_key
        );
        let invite_id = unlocked.invites[0].id.clone();
        assert_eq!(
            unlocked.open_invite(&invite_id).unwrap().secret(),
            Some(invite_secret.as_str())
        );
    }

    #[tokio::test]
    async fn test_non_owner_cannot_unlock() {
        let owner = Account::generate("alice", "Alice", "alice@example.com");
        let outsider = Account::generate("eve", "Eve", "eve@example.com");
        let mut org = org();
        org.initialize(&owner, provider()).await.unwrap().lock();

        let err = org.unlock(&outsider, provider()).await.unwrap_err();
        assert!(matches!(err, OrgError::Container(_)));
    }

    #[test]
    fn test_vault_and_group_helpers() {
        let account = Account::generate("bob", "Bob", "bob@example.com");
        let mut org = org();
        org.members.push(Member::from_info(MemberInfo {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            public_key: account.public_key(),
            org_signature: Vec::new(),
            role: None,
        }));

        org.add_vault("v1", "Shared");
        org.add_vault("v1", "Renamed");
        assert_eq!(org.vaults.len(), 1);
        assert_eq!(org.vaults[0].name, "Renamed");

        org.put_group(Group::new("devs"));
        org.add_group_member("devs", "bob").unwrap();
        org.add_group_member("devs", "bob").unwrap();
        assert_eq!(org.groups[0].members, vec!["bob".to_string()]);

        org.grant_member_vault("bob", "v1", true).unwrap();
        org.grant_member_vault("bob", "v1", false).unwrap();
        assert_eq!(org.members[0].vaults, vec![VaultGrant::new("v1", false)]);
        org.grant_group_vault("devs", "v1", true).unwrap();

        assert!(matches!(
            org.grant_member_vault("bob", "nope", false),
            Err(OrgError::VaultNotFound(_))
        ));
        assert!(matches!(
            org.add_group_member("devs", "ghost"),
            Err(OrgError::MemberNotFound(_))
        ));
        assert!(matches!(
            org.grant_group_vault("ops", "v1", false),
            Err(OrgError::GroupNotFound(_))
        ));

        let revision = org.revision.clone();
        org.remove_vault("v1").unwrap();
        assert_ne!(org.revision, revision);
        assert!(org.members[0].vaults.is_empty());
        assert!(org.groups[0].vaults.is_empty());
    }

    #[test]
    fn test_remove_member_prunes_groups() {
        let account = Account::generate("bob", "Bob", "bob@example.com");
        let mut org = org();
        org.members.push(Member::from_info(MemberInfo {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            public_key: account.public_key(),
            org_signature: Vec::new(),
            role: Some(Role::Owner),
        }));
        org.put_group(Group::new("devs"));
        org.add_group_member("devs", "bob").unwrap();

        let removed = org.remove_member("bob").unwrap();
        assert_eq!(removed.id, "bob");
        assert!(org.members.is_empty());
        assert!(org.groups[0].members.is_empty());
        assert!(matches!(
            org.remove_member("bob"),
            Err(OrgError::MemberNotFound(_))
        ));
    }
}
