//! Pending invitations
//!
//! The key exchange itself happens elsewhere; the organization only keeps the
//! invite record with its secret sealed under the org invites key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::{CryptoError, SealedData, SymmetricKey};

/// Why an invite was issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitePurpose {
    /// A new account joins the organization
    #[default]
    Join,
    /// An existing (usually suspended) member re-confirms their identity
    ConfirmMembership,
}

impl std::fmt::Display for InvitePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitePurpose::Join => write!(f, "join"),
            InvitePurpose::ConfirmMembership => write!(f, "confirm_membership"),
        }
    }
}

/// A pending invitation
#[derive(Clone, Serialize, Deserialize)]
pub struct Invite {
    /// Invite id
    pub id: String,

    /// Invitee email
    pub email: String,

    /// Purpose
    #[serde(default)]
    pub purpose: InvitePurpose,

    /// When the invite was created
    pub created: DateTime<Utc>,

    /// When the invite stops being valid
    pub expires: DateTime<Utc>,

    /// Secret sealed under the org invites key
    sealed_secret: SealedData,

    #[serde(skip)]
    secret: Option<Zeroizing<String>>,
}

impl Invite {
    /// Create an invite with a fresh random secret sealed under `invites_key`
    pub(crate) fn new(
        email: impl Into<String>,
        purpose: InvitePurpose,
        ttl: Duration,
        invites_key: &SymmetricKey,
    ) -> Result<Self, CryptoError> {
        let mut raw = [0u8; 16];
        OsRng.fill_bytes(&mut raw);
        let secret = Zeroizing::new(URL_SAFE_NO_PAD.encode(raw));

        let sealed_secret = invites_key.seal(secret.as_bytes())?;
        let created = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            purpose,
            created,
            expires: created + ttl,
            sealed_secret,
            secret: Some(secret),
        })
    }

    /// The decrypted secret, if the invite is unlocked
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_ref().map(|s| s.as_str())
    }

    /// Whether the invite has passed its expiry time
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires
    }

    /// Decrypt the secret with the org invites key
    pub(crate) fn unlock(&mut self, invites_key: &SymmetricKey) -> Result<(), CryptoError> {
        let bytes = invites_key.open(&self.sealed_secret)?;
        let secret = String::from_utf8(bytes).map_err(|_| CryptoError::OpenFailed)?;
        self.secret = Some(Zeroizing::new(secret));
        Ok(())
    }

    /// Re-seal the secret under a new invites key
    pub(crate) fn reseal(
        &mut self,
        old_key: &SymmetricKey,
        new_key: &SymmetricKey,
    ) -> Result<(), CryptoError> {
        let bytes = Zeroizing::new(old_key.open(&self.sealed_secret)?);
        self.sealed_secret = new_key.seal(&bytes)?;
        Ok(())
    }

    /// Erase the decrypted secret from memory
    pub fn lock(&mut self) {
        self.secret = None;
    }
}

impl std::fmt::Debug for Invite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invite")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("purpose", &self.purpose)
            .field("expires", &self.expires)
            .field("unlocked", &self.secret.is_some())
            .finish()
    }
}
