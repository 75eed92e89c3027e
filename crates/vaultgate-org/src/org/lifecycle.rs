//! Unlocked organization: key generation, rotation and member attestation
//!
//! [`UnlockedOrganization`] borrows the organization mutably and owns the
//! decrypted secrets for as long as it lives. Dropping it (or calling
//! [`UnlockedOrganization::lock`]) zeroizes the secrets, locks the container
//! and locks every invite.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::invite::{Invite, InvitePurpose};
use super::organization::Organization;
use super::signature::{sign_member, verify_member};
use super::types::{Member, MemberInfo};
use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_INVITE_TTL_HOURS};
use crate::container::{Accessor, KeyContainer};
use crate::crypto::{CryptoError, CryptoProvider, SecretKey, SigningParams, SymmetricKey};
use crate::error::{OrgError, Result};

/// Decrypted organization secrets
pub(crate) struct OrgSecrets {
    private_key: SecretKey,
    invites_key: SymmetricKey,
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct SecretsPayload {
    private_key: String,
    invites_key: String,
}

impl OrgSecrets {
    /// Encode as the container payload
    pub(crate) fn encode(&self) -> Result<Zeroizing<Vec<u8>>> {
        let payload = SecretsPayload {
            private_key: STANDARD.encode(self.private_key.expose()),
            invites_key: STANDARD.encode(self.invites_key.as_bytes()),
        };
        Ok(Zeroizing::new(serde_json::to_vec(&payload)?))
    }

    /// Decode a container payload
    pub(crate) fn decode(data: &[u8]) -> Result<Self> {
        let payload: SecretsPayload = serde_json::from_slice(data)
            .map_err(|e| OrgError::InvalidPayload(e.to_string()))?;

        let private_key = Zeroizing::new(
            STANDARD
                .decode(&payload.private_key)
                .map_err(|e| OrgError::InvalidPayload(format!("private_key: {}", e)))?,
        );
        let invites_key = Zeroizing::new(
            STANDARD
                .decode(&payload.invites_key)
                .map_err(|e| OrgError::InvalidPayload(format!("invites_key: {}", e)))?,
        );

        Ok(Self {
            private_key: SecretKey::new(private_key.to_vec()),
            invites_key: SymmetricKey::from_bytes(&invites_key)?,
        })
    }
}

/// Generate a signing keypair and an invites key.
///
/// Returns the public signing key alongside the secrets.
pub(crate) async fn generate_secrets(
    provider: &dyn CryptoProvider,
    params: &SigningParams,
) -> Result<(Vec<u8>, OrgSecrets)> {
    let keys = provider.generate_signing_key(params).await?;
    let invites_key = provider.generate_symmetric_key().await?;
    Ok((
        keys.public_key,
        OrgSecrets {
            private_key: keys.private_key,
            invites_key,
        },
    ))
}

/// An organization with its secrets decrypted
pub struct UnlockedOrganization<'a, C: KeyContainer> {
    org: &'a mut Organization<C>,
    secrets: OrgSecrets,
    provider: Arc<dyn CryptoProvider>,
    concurrency: usize,
    invite_ttl: Duration,
}

impl<'a, C: KeyContainer> UnlockedOrganization<'a, C> {
    pub(crate) fn new(
        org: &'a mut Organization<C>,
        secrets: OrgSecrets,
        provider: Arc<dyn CryptoProvider>,
    ) -> Self {
        Self {
            org,
            secrets,
            provider,
            concurrency: DEFAULT_CONCURRENCY,
            invite_ttl: Duration::hours(i64::from(DEFAULT_INVITE_TTL_HOURS)),
        }
    }

    /// Limit the number of signatures checked or produced at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set how long new invites stay valid
    pub fn with_invite_ttl(mut self, ttl: Duration) -> Self {
        self.invite_ttl = ttl;
        self
    }

    /// Crypto provider in use
    pub fn provider(&self) -> &dyn CryptoProvider {
        self.provider.as_ref()
    }

    /// Key used to seal invite secrets
    pub fn invites_key(&self) -> &SymmetricKey {
        &self.secrets.invites_key
    }

    pub(crate) fn private_key(&self) -> &SecretKey {
        &self.secrets.private_key
    }

    fn public_key_bytes(&self) -> Result<&[u8]> {
        self.org.public_key.as_deref().ok_or_else(|| {
            OrgError::Crypto(CryptoError::InvalidPublicKey(
                "organization has no public key".to_string(),
            ))
        })
    }

    /// Replace the signing keypair and invites key.
    ///
    /// Existing member signatures are not touched and stop verifying; use
    /// [`rotate_keys`](Self::rotate_keys) to re-attest members.
    #[instrument(skip_all, fields(org = %self.org.id))]
    pub async fn generate_keys(&mut self) -> Result<()> {
        let (public_key, secrets) =
            generate_secrets(self.provider.as_ref(), &self.org.signing_params).await?;
        self.org.container.set_data(&secrets.encode()?).await?;

        self.org.public_key = Some(public_key);
        self.secrets = secrets;
        self.org.touch();
        info!("generated organization keys");
        Ok(())
    }

    /// Sign a member's identity fields with the organization key
    pub async fn sign(&self, member: &mut Member) -> Result<()> {
        let signature = sign_member(
            self.provider.as_ref(),
            &self.secrets.private_key,
            &self.org.signing_params,
            member,
        )
        .await?;
        member.signature = Some(signature);
        Ok(())
    }

    /// Verify a member's signature against the organization public key
    pub async fn verify(&self, member: &Member) -> Result<()> {
        verify_member(
            self.provider.as_ref(),
            self.public_key_bytes()?,
            &self.org.signing_params,
            member,
        )
        .await
    }

    /// Verify every member that is not suspended.
    ///
    /// Stops at the first failure; verifications still in flight are dropped.
    #[instrument(skip_all, fields(org = %self.org.id))]
    pub async fn verify_all(&self) -> Result<()> {
        let members: Vec<&Member> = self
            .org
            .members
            .iter()
            .filter(|m| !m.is_suspended())
            .collect();
        self.verify_members(&members).await?;
        debug!(count = members.len(), "verified members");
        Ok(())
    }

    /// Verify an explicit set of members concurrently
    pub async fn verify_members(&self, members: &[&Member]) -> Result<()> {
        let public_key = self.public_key_bytes()?;
        let provider = self.provider.as_ref();
        let params = &self.org.signing_params;

        stream::iter(members.iter().copied())
            .map(Ok::<_, OrgError>)
            .try_for_each_concurrent(self.concurrency, |member| {
                verify_member(provider, public_key, params, member)
            })
            .await
    }

    /// Rotate the signing keypair and invites key.
    ///
    /// Unless `force` is set, every non-suspended member must verify under
    /// the current key first. All members (suspended ones included) are
    /// re-signed under the new key and a copy of the container is re-keyed
    /// for the current owners. The copy, signatures and keys are committed
    /// together once everything succeeded; any failure leaves the
    /// organization untouched.
    #[instrument(skip_all, fields(org = %self.org.id, force = force))]
    pub async fn rotate_keys(&mut self, force: bool) -> Result<()> {
        if !force {
            if let Err(e) = self.verify_all().await {
                warn!(error = %e, "aborting key rotation");
                return Err(e);
            }
        }

        let owners: Vec<Accessor> = self
            .org
            .owners()
            .map(|m| Accessor {
                id: m.id.clone(),
                public_key: m.public_key.clone(),
            })
            .collect();
        if owners.is_empty() {
            return Err(OrgError::NoOwners);
        }

        let params = self.org.signing_params;
        let (public_key, secrets) = generate_secrets(self.provider.as_ref(), &params).await?;

        let signatures = {
            let provider = self.provider.as_ref();
            let private_key = &secrets.private_key;
            stream::iter(self.org.members.iter().enumerate())
                .map(|(idx, member)| async move {
                    let signature = sign_member(provider, private_key, &params, member).await?;
                    Ok::<_, OrgError>((idx, signature))
                })
                .buffer_unordered(self.concurrency)
                .try_collect::<Vec<_>>()
                .await?
        };

        let mut invites = self.org.invites.clone();
        for invite in &mut invites {
            invite.reseal(&self.secrets.invites_key, &secrets.invites_key)?;
        }

        let payload = secrets.encode()?;
        let mut container = self.org.container.clone();
        container.clear();
        container.update_accessors(owners).await?;
        container.set_data(&payload).await?;

        self.org.container = container;
        for (idx, signature) in signatures {
            self.org.members[idx].signature = Some(signature);
        }
        self.org.invites = invites;
        self.org.public_key = Some(public_key);
        self.secrets = secrets;
        self.org.touch();

        info!(
            members = self.org.members.len(),
            accessors = self.org.container.accessors().len(),
            "rotated organization keys"
        );
        Ok(())
    }

    /// Create or update a member and sign it.
    ///
    /// An existing member keeps its role unless `info.role` is set. New
    /// members default to [`Role::Member`](super::Role::Member).
    #[instrument(skip_all, fields(org = %self.org.id, member = %info.id))]
    pub async fn add_or_update_member(&mut self, info: MemberInfo) -> Result<&Member> {
        info.public_key.validate()?;
        let existing = self.org.members.iter().position(|m| m.id == info.id);

        let mut member = match existing {
            Some(idx) => {
                let mut member = self.org.members[idx].clone();
                member.name = info.name;
                member.email = info.email;
                member.public_key = info.public_key;
                member.org_signature = info.org_signature;
                if let Some(role) = info.role {
                    member.role = role;
                }
                member.updated = Utc::now();
                member
            }
            None => Member::from_info(info),
        };
        self.sign(&mut member).await?;

        let idx = match existing {
            Some(idx) => {
                self.org.members[idx] = member;
                info!("updated member");
                idx
            }
            None => {
                self.org.members.push(member);
                info!("added member");
                self.org.members.len() - 1
            }
        };
        self.org.touch();
        Ok(&self.org.members[idx])
    }

    /// Issue an invite sealed under the invites key
    #[instrument(skip_all, fields(org = %self.org.id, purpose = %purpose))]
    pub fn create_invite(&mut self, email: &str, purpose: InvitePurpose) -> Result<&Invite> {
        let invite = Invite::new(email, purpose, self.invite_ttl, &self.secrets.invites_key)?;
        info!(invite = %invite.id, "created invite");
        self.org.invites.push(invite);
        self.org.touch();
        let idx = self.org.invites.len() - 1;
        Ok(&self.org.invites[idx])
    }

    /// Decrypt an invite's secret
    pub fn open_invite(&mut self, id: &str) -> Result<&Invite> {
        let invites_key = &self.secrets.invites_key;
        let invite = self
            .org
            .invites
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| OrgError::InviteNotFound(id.to_string()))?;

        invite.unlock(invites_key)?;
        if invite.is_expired() {
            warn!(invite = %invite.id, "opened an expired invite");
        }
        Ok(invite)
    }

    /// Lock the organization and erase its secrets
    pub fn lock(self) {
        debug!(org = %self.org.id, "locking organization");
    }
}

impl<C: KeyContainer> Drop for UnlockedOrganization<'_, C> {
    fn drop(&mut self) {
        self.org.container.lock();
        for invite in &mut self.org.invites {
            invite.lock();
        }
    }
}

impl<C: KeyContainer> std::fmt::Debug for UnlockedOrganization<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedOrganization")
            .field("org", &self.org.id)
            .field("provider", &self.provider.name())
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl<C: KeyContainer> Deref for UnlockedOrganization<'_, C> {
    type Target = Organization<C>;

    fn deref(&self) -> &Self::Target {
        &*self.org
    }
}

impl<C: KeyContainer> DerefMut for UnlockedOrganization<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.org
    }
}
