//! Access resolution over members, groups and vaults
//!
//! Everything here is read-only and works on a locked organization. Links
//! are plain ids; an id that points nowhere simply never matches.

use super::organization::Organization;
use super::roles::Role;
use super::types::{Group, Member, VaultGrant};
use crate::container::KeyContainer;
use crate::error::{OrgError, Result};

impl<C: KeyContainer> Organization<C> {
    /// Look up a member by account id
    pub fn get_member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Look up a group by name
    pub fn get_group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Whether the account is a member with owner privileges
    pub fn is_owner(&self, id: &str) -> bool {
        self.has_privilege(id, Role::Owner)
    }

    /// Whether the account is a member with at least admin privileges
    pub fn is_admin(&self, id: &str) -> bool {
        self.has_privilege(id, Role::Admin)
    }

    fn has_privilege(&self, id: &str, required: Role) -> bool {
        self.get_member(id)
            .map(|m| m.role.has_privilege_of(required))
            .unwrap_or(false)
    }

    /// Members holding the owner role
    pub fn owners(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| m.role == Role::Owner)
    }

    /// Groups listing the given member id
    pub fn get_groups_for_member(&self, id: &str) -> Vec<&Group> {
        self.groups.iter().filter(|g| g.has_member(id)).collect()
    }

    /// Groups with a grant for the given vault
    pub fn get_groups_for_vault(&self, vault_id: &str) -> Vec<&Group> {
        self.groups
            .iter()
            .filter(|g| g.vault_grant(vault_id).is_some())
            .collect()
    }

    /// Members listed in a group; ids without a member record are skipped
    pub fn get_members_for_group(&self, group: &Group) -> Vec<&Member> {
        group
            .members
            .iter()
            .filter_map(|id| self.get_member(id))
            .collect()
    }

    /// Vault ids a member can reach, directly or through groups.
    ///
    /// Direct grants come first, each id appears once.
    pub fn get_vaults_for_member(&self, id: &str) -> Result<Vec<&str>> {
        let member = self
            .get_member(id)
            .ok_or_else(|| OrgError::MemberNotFound(id.to_string()))?;

        let mut vaults: Vec<&str> = Vec::new();
        let groups = self.get_groups_for_member(id);
        let grants = member
            .vaults
            .iter()
            .chain(groups.into_iter().flat_map(|g| g.vaults.iter()));
        for grant in grants {
            if !vaults.contains(&grant.id.as_str()) {
                vaults.push(&grant.id);
            }
        }
        Ok(vaults)
    }

    /// Members who can access a vault.
    ///
    /// Suspended members are left out of direct assignments; group
    /// membership is taken as listed. Each member appears once, in the order
    /// first seen.
    pub fn get_accessors(&self, vault_id: &str) -> Vec<&Member> {
        let direct = self
            .members
            .iter()
            .filter(|m| !m.is_suspended() && m.vault_grant(vault_id).is_some());
        let via_groups = self
            .get_groups_for_vault(vault_id)
            .into_iter()
            .flat_map(|g| self.get_members_for_group(g));

        let mut accessors: Vec<&Member> = Vec::new();
        for member in direct.chain(via_groups) {
            if !accessors.iter().any(|m| m.id == member.id) {
                accessors.push(member);
            }
        }
        accessors
    }

    /// Whether the member has any grant for the vault
    pub fn can_read(&self, vault_id: &str, id: &str) -> bool {
        self.get_member(id)
            .map(|m| self.grants_for(m, vault_id).next().is_some())
            .unwrap_or(false)
    }

    /// Whether the member has a writable grant for the vault.
    ///
    /// Suspended members never write. A read-only grant from one source does
    /// not cancel a writable grant from another.
    pub fn can_write(&self, vault_id: &str, id: &str) -> bool {
        match self.get_member(id) {
            Some(member) if !member.is_suspended() => {
                self.grants_for(member, vault_id).any(|g| !g.readonly)
            }
            _ => false,
        }
    }

    fn grants_for<'s>(
        &'s self,
        member: &'s Member,
        vault_id: &'s str,
    ) -> impl Iterator<Item = &'s VaultGrant> + 's {
        let direct = member.vault_grant(vault_id);
        let via_groups = self
            .groups
            .iter()
            .filter(move |g| g.has_member(&member.id))
            .filter_map(move |g| g.vault_grant(vault_id));
        direct.into_iter().chain(via_groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::container::AgeContainer;
    use crate::org::types::{MemberInfo, OrgType};

    fn member(id: &str, role: Role) -> Member {
        let account = Account::generate(id, id.to_uppercase(), format!("{}@example.com", id));
        Member::from_info(MemberInfo {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            public_key: account.public_key(),
            org_signature: Vec::new(),
            role: Some(role),
        })
    }

    fn org() -> Organization {
        let mut org = Organization::new("Acme", "alice", OrgType::Business, AgeContainer::new());
        org.members.push(member("alice", Role::Owner));
        org.members.push(member("bob", Role::Admin));
        org.members.push(member("carol", Role::Member));
        org.members.push(member("dave", Role::Suspended));
        org.add_vault("v1", "Engineering");
        org.add_vault("v2", "Finance");
        org.add_vault("v3", "Archive");
        org
    }

    #[test]
    fn test_role_checks() {
        let org = org();
        assert!(org.is_owner("alice"));
        assert!(org.is_admin("alice"));
        assert!(!org.is_owner("bob"));
        assert!(org.is_admin("bob"));
        assert!(!org.is_admin("carol"));
        assert!(!org.is_admin("dave"));
        assert!(!org.is_owner("nobody"));
        assert_eq!(org.owners().map(|m| m.id.as_str()).collect::<Vec<_>>(), vec!["alice"]);
    }

    #[test]
    fn test_vaults_for_member_is_union() {
        let mut org = org();
        org.grant_member_vault("carol", "v1", true).unwrap();
        let mut devs = Group::new("devs");
        devs.members.push("carol".to_string());
        devs.vaults.push(VaultGrant::new("v1", false));
        devs.vaults.push(VaultGrant::new("v2", true));
        org.put_group(devs);

        assert_eq!(org.get_vaults_for_member("carol").unwrap(), vec!["v1", "v2"]);
        assert!(org.get_vaults_for_member("bob").unwrap().is_empty());
        assert!(matches!(
            org.get_vaults_for_member("nobody"),
            Err(OrgError::MemberNotFound(id)) if id == "nobody"
        ));
    }

    #[test]
    fn test_accessors_deduplicated_and_filtered() {
        let mut org = org();
        org.grant_member_vault("carol", "v1", false).unwrap();
        org.grant_member_vault("dave", "v1", false).unwrap();
        org.grant_member_vault("bob", "v2", false).unwrap();

        let mut devs = Group::new("devs");
        devs.members = vec!["carol".to_string(), "ghost".to_string(), "bob".to_string()];
        devs.vaults.push(VaultGrant::new("v1", true));
        org.put_group(devs);

        let ids: Vec<&str> = org.get_accessors("v1").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["carol", "bob"]);
        assert!(org.get_accessors("v3").is_empty());
    }

    #[test]
    fn test_group_members_of_suspended_are_listed() {
        let mut org = org();
        let mut legacy = Group::new("legacy");
        legacy.members.push("dave".to_string());
        legacy.vaults.push(VaultGrant::new("v3", true));
        org.put_group(legacy);

        let ids: Vec<&str> = org.get_accessors("v3").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["dave"]);
    }

    #[test]
    fn test_read_and_write() {
        let mut org = org();
        org.grant_member_vault("carol", "v1", true).unwrap();
        org.grant_member_vault("dave", "v1", false).unwrap();

        assert!(org.can_read("v1", "carol"));
        assert!(!org.can_write("v1", "carol"));

        // suspended members can read but never write
        assert!(org.can_read("v1", "dave"));
        assert!(!org.can_write("v1", "dave"));

        assert!(!org.can_read("v2", "carol"));
        assert!(!org.can_read("v1", "nobody"));
        assert!(!org.can_write("v1", "nobody"));
    }

    #[test]
    fn test_writable_direct_grant() {
        let mut org = org();
        org.grant_member_vault("bob", "v2", false).unwrap();

        assert!(org.can_read("v2", "bob"));
        assert!(org.can_write("v2", "bob"));
        assert_eq!(org.get_vaults_for_member("bob").unwrap(), vec!["v2"]);
    }

    #[test]
    fn test_group_only_access() {
        let mut org = org();
        let mut devs = Group::new("devs");
        devs.members.push("carol".to_string());
        devs.vaults.push(VaultGrant::new("v1", false));
        org.put_group(devs);

        assert!(org.get_member("carol").unwrap().vaults.is_empty());
        assert_eq!(org.get_vaults_for_member("carol").unwrap(), vec!["v1"]);
        assert!(org.can_read("v1", "carol"));
        assert!(org.can_write("v1", "carol"));
        let ids: Vec<&str> = org.get_accessors("v1").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["carol"]);
    }

    #[test]
    fn test_write_is_or_across_sources() {
        let mut org = org();
        org.grant_member_vault("carol", "v1", true).unwrap();

        let mut writers = Group::new("writers");
        writers.members.push("carol".to_string());
        writers.vaults.push(VaultGrant::new("v1", false));
        org.put_group(writers);

        let mut readers = Group::new("readers");
        readers.members.push("carol".to_string());
        readers.vaults.push(VaultGrant::new("v1", true));
        org.put_group(readers);

        assert!(org.can_write("v1", "carol"));

        org.remove_group("writers").unwrap();
        assert!(!org.can_write("v1", "carol"));
        assert!(org.can_read("v1", "carol"));
    }

    #[test]
    fn test_dangling_ids_never_match() {
        let mut org = org();
        let mut ghosts = Group::new("ghosts");
        ghosts.members.push("ghost".to_string());
        ghosts.vaults.push(VaultGrant::new("missing-vault", false));
        org.put_group(ghosts);

        let group = org.get_group("ghosts").unwrap();
        assert!(org.get_members_for_group(group).is_empty());
        assert!(org.get_accessors("missing-vault").is_empty());
        assert!(!org.can_read("missing-vault", "ghost"));
        assert_eq!(org.get_groups_for_member("ghost").len(), 1);
        assert_eq!(org.get_groups_for_vault("missing-vault").len(), 1);
    }
}
