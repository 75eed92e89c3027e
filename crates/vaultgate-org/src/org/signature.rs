//! Identity signature protocol
//!
//! The organization signs the exact byte concatenation
//! `id || email || role || public_key` of each member, and each member signs
//! `org_id || org_public_key`. No separators and no structured encoding are
//! involved, so signer and verifier cannot disagree on the message, and the
//! single role byte cannot be re-typed into a different privilege.

use tracing::debug;

use super::types::Member;
use crate::crypto::{CryptoError, CryptoProvider, SecretKey, SigningParams};
use crate::error::{OrgError, Result};

/// Bytes the organization signs for a member
pub fn member_message(member: &Member) -> Vec<u8> {
    let public_key = member.public_key.to_bytes();
    let mut message =
        Vec::with_capacity(member.id.len() + member.email.len() + 1 + public_key.len());
    message.extend_from_slice(member.id.as_bytes());
    message.extend_from_slice(member.email.as_bytes());
    message.push(member.role.as_byte());
    message.extend_from_slice(&public_key);
    message
}

/// Bytes an account signs to attest an organization's identity
pub fn org_identity_message(org_id: &str, org_public_key: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(org_id.len() + org_public_key.len());
    message.extend_from_slice(org_id.as_bytes());
    message.extend_from_slice(org_public_key);
    message
}

/// Produce the organization's signature over a member's identity fields
pub async fn sign_member(
    provider: &dyn CryptoProvider,
    private_key: &SecretKey,
    params: &SigningParams,
    member: &Member,
) -> Result<Vec<u8>> {
    let signature = provider
        .sign(private_key, &member_message(member), params)
        .await?;
    debug!(member = %member.id, "signed member");
    Ok(signature)
}

/// Check a member's signature against the organization public key
pub async fn verify_member(
    provider: &dyn CryptoProvider,
    public_key: &[u8],
    params: &SigningParams,
    member: &Member,
) -> Result<()> {
    let signature = member
        .signature
        .as_deref()
        .ok_or_else(|| OrgError::verification(&member.name))?;

    match provider
        .verify(public_key, signature, &member_message(member), params)
        .await
    {
        Ok(true) => Ok(()),
        Ok(false) | Err(CryptoError::InvalidSignature(_)) => {
            debug!(member = %member.id, "member signature mismatch");
            Err(OrgError::verification(&member.name))
        }
        Err(e) => Err(e.into()),
    }
}
