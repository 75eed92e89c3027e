//! Join requests
//!
//! A prospective member hands an owner their [`MemberInfo`] together with a
//! signature over their own public key bundle. The self-signature binds the
//! age recipient to the Ed25519 key, so neither half can be swapped in
//! transit without the request failing [`JoinRequest::verify`].

use serde::{Deserialize, Serialize};

use super::types::MemberInfo;
use crate::account::Account;
use crate::encoding::base64_serde;
use crate::error::{OrgError, Result};

/// A member's request to join an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    #[serde(flatten)]
    pub member: MemberInfo,

    /// Signature over `member.public_key.to_bytes()` by the member's own key
    #[serde(with = "base64_serde")]
    pub key_signature: Vec<u8>,
}

impl JoinRequest {
    /// Build a request attesting the organization `org_id` with key `org_public_key`
    pub fn new(account: &Account, org_id: &str, org_public_key: &[u8]) -> Self {
        Self {
            member: MemberInfo {
                id: account.id.clone(),
                name: account.name.clone(),
                email: account.email.clone(),
                public_key: account.public_key(),
                org_signature: account.sign_org(org_id, org_public_key),
                role: None,
            },
            key_signature: account.sign_public_key(),
        }
    }

    /// Check the request was made for this organization and key, and that
    /// its public key bundle is well formed and self-consistent
    pub fn verify(&self, org_id: &str, org_public_key: &[u8]) -> Result<()> {
        let public_key = &self.member.public_key;
        public_key.validate()?;

        if !public_key.verify_self_signature(&self.key_signature)? {
            return Err(OrgError::InvalidJoinRequest(format!(
                "public key of {} is not self-signed",
                self.member.email
            )));
        }
        if !public_key.verify_org_signature(org_id, org_public_key, &self.member.org_signature)? {
            return Err(OrgError::InvalidJoinRequest(format!(
                "request from {} was not made for this organization or its current key",
                self.member.email
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::org::roles::Role;

    const ORG_KEY: [u8; 32] = [9u8; 32];

    fn request() -> JoinRequest {
        let bob = Account::generate("bob", "Bob", "bob@example.com");
        JoinRequest::new(&bob, "org-1", &ORG_KEY)
    }

    #[test]
    fn test_fresh_request_verifies() {
        request().verify("org-1", &ORG_KEY).unwrap();
    }

    #[test]
    fn test_swapped_recipient_is_rejected() {
        let mut req = request();
        req.member.public_key.encryption = Account::generate("m", "Mallory", "m@example.com")
            .public_key()
            .encryption;
        assert!(matches!(
            req.verify("org-1", &ORG_KEY),
            Err(OrgError::InvalidJoinRequest(_))
        ));
    }

    #[test]
    fn test_malformed_recipient_is_rejected() {
        let mut req = request();
        req.member.public_key.encryption = "not-an-age-recipient".to_string();
        assert!(matches!(req.verify("org-1", &ORG_KEY), Err(OrgError::Crypto(_))));
    }

    #[test]
    fn test_other_org_or_key_is_rejected() {
        let req = request();
        assert!(matches!(
            req.verify("org-2", &ORG_KEY),
            Err(OrgError::InvalidJoinRequest(_))
        ));
        assert!(matches!(
            req.verify("org-1", &[1u8; 32]),
            Err(OrgError::InvalidJoinRequest(_))
        ));
    }

    #[test]
    fn test_yaml_form_is_flat() {
        let mut req = request();
        req.member.role = Some(Role::Admin);
        let yaml = serde_yaml::to_string(&req).unwrap();
        assert!(yaml.contains("key_signature:"));
        assert!(yaml.contains("org_signature:"));

        let restored: JoinRequest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, req);
        restored.verify("org-1", &ORG_KEY).unwrap();
    }
}
