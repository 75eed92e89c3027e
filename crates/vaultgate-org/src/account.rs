//! Accounts and their public key bundles
//!
//! An account holds two keys: an Ed25519 key it uses to attest the identity
//! of organizations it joins, and an age X25519 identity that makes it an
//! accessor of encrypted payloads.

use age::secrecy::ExposeSecret;
use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::container::Accessor;
use crate::crypto::provider::{signing_key_from_bytes, verifying_key_from_bytes};
use crate::crypto::CryptoError;
use crate::encoding::{base64_serde, fingerprint};
use crate::org::org_identity_message;

/// Public half of an account's keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountPublicKey {
    /// Ed25519 verifying key (32 bytes)
    #[serde(with = "base64_serde")]
    pub signing: Vec<u8>,

    /// Age X25519 recipient (`age1...`)
    pub encryption: String,
}

impl AccountPublicKey {
    /// Canonical raw bytes: signing key followed by the recipient string.
    ///
    /// These bytes are bound into member signatures, so the layout must not
    /// change.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.signing.len() + self.encryption.len());
        bytes.extend_from_slice(&self.signing);
        bytes.extend_from_slice(self.encryption.as_bytes());
        bytes
    }

    /// Short SHA-256 fingerprint for display
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.to_bytes())
    }

    /// Parse the age recipient
    pub fn recipient(&self) -> Result<age::x25519::Recipient, CryptoError> {
        self.encryption
            .parse::<age::x25519::Recipient>()
            .map_err(|e| CryptoError::InvalidPublicKey(format!("{}: {}", self.encryption, e)))
    }

    /// Check that both keys parse
    pub fn validate(&self) -> Result<(), CryptoError> {
        verifying_key_from_bytes(&self.signing)?;
        self.recipient()?;
        Ok(())
    }

    /// Check a signature produced by [`Account::sign_public_key`]
    pub fn verify_self_signature(&self, signature: &[u8]) -> Result<bool, CryptoError> {
        self.verify_raw(&self.to_bytes(), signature)
    }

    /// Check an org signature produced by [`Account::sign_org`]
    pub fn verify_org_signature(
        &self,
        org_id: &str,
        org_public_key: &[u8],
        signature: &[u8],
    ) -> Result<bool, CryptoError> {
        self.verify_raw(&org_identity_message(org_id, org_public_key), signature)
    }

    fn verify_raw(&self, message: &[u8], signature: &[u8]) -> Result<bool, CryptoError> {
        let pk = verifying_key_from_bytes(&self.signing)?;
        let sig = ed25519_dalek::Signature::from_slice(signature)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Ok(pk.verify(message, &sig).is_ok())
    }
}

/// An account with its private keys loaded
pub struct Account {
    /// Account id
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    signing_key: ed25519_dalek::SigningKey,
    encryption_key: age::x25519::Identity,
}

impl Account {
    /// Generate an account with fresh keys
    pub fn generate(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            signing_key: ed25519_dalek::SigningKey::generate(&mut OsRng),
            encryption_key: age::x25519::Identity::generate(),
        }
    }

    /// The account's public key bundle
    pub fn public_key(&self) -> AccountPublicKey {
        AccountPublicKey {
            signing: self.signing_key.verifying_key().to_bytes().to_vec(),
            encryption: self.encryption_key.to_public().to_string(),
        }
    }

    /// This account as a key container accessor
    pub fn accessor(&self) -> Accessor {
        Accessor {
            id: self.id.clone(),
            public_key: self.public_key(),
        }
    }

    /// Attest an organization's identity (id and public key)
    pub fn sign_org(&self, org_id: &str, org_public_key: &[u8]) -> Vec<u8> {
        self.signing_key
            .sign(&org_identity_message(org_id, org_public_key))
            .to_bytes()
            .to_vec()
    }

    /// Sign this account's own public key bundle, binding the age recipient
    /// to the signing key
    pub fn sign_public_key(&self) -> Vec<u8> {
        self.signing_key
            .sign(&self.public_key().to_bytes())
            .to_bytes()
            .to_vec()
    }

    pub(crate) fn encryption_identity(&self) -> &age::x25519::Identity {
        &self.encryption_key
    }

    /// Export private keys for storage in a key file
    pub fn to_key_file(&self) -> AccountKeyFile {
        AccountKeyFile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            signing_key: STANDARD.encode(self.signing_key.to_bytes()),
            encryption_key: self.encryption_key.to_string().expose_secret().to_string(),
        }
    }

    /// Load an account from a key file
    pub fn from_key_file(file: &AccountKeyFile) -> Result<Self, CryptoError> {
        let signing_bytes = STANDARD
            .decode(&file.signing_key)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let signing_key = signing_key_from_bytes(&signing_bytes)?;
        let encryption_key = file
            .encryption_key
            .parse::<age::x25519::Identity>()
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self {
            id: file.id.clone(),
            name: file.name.clone(),
            email: file.email.clone(),
            signing_key,
            encryption_key,
        })
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// On-disk form of an account's keys (keep secret!)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountKeyFile {
    /// Account id
    pub id: String,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Base64 Ed25519 secret key
    pub signing_key: String,
    /// Age secret key (`AGE-SECRET-KEY-...`)
    pub encryption_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_bytes_layout() {
        let account = Account::generate("a1", "Alice", "alice@example.com");
        let pk = account.public_key();

        assert_eq!(pk.signing.len(), 32);
        assert!(pk.encryption.starts_with("age1"));

        let bytes = pk.to_bytes();
        assert_eq!(&bytes[..32], pk.signing.as_slice());
        assert_eq!(&bytes[32..], pk.encryption.as_bytes());
    }

    #[test]
    fn test_org_signature_roundtrip() {
        let account = Account::generate("a1", "Alice", "alice@example.com");
        let sig = account.sign_org("org-1", &[7u8; 32]);

        let pk = account.public_key();
        assert!(pk.verify_org_signature("org-1", &[7u8; 32], &sig).unwrap());
        assert!(!pk.verify_org_signature("org-2", &[7u8; 32], &sig).unwrap());
        assert!(!pk.verify_org_signature("org-1", &[8u8; 32], &sig).unwrap());
    }

    #[test]
    fn test_self_signature_binds_recipient() {
        let account = Account::generate("a1", "Alice", "alice@example.com");
        let sig = account.sign_public_key();
        let mut pk = account.public_key();
        assert!(pk.verify_self_signature(&sig).unwrap());

        pk.encryption = Account::generate("m", "Mallory", "m@example.com")
            .public_key()
            .encryption;
        assert!(!pk.verify_self_signature(&sig).unwrap());
    }

    #[test]
    fn test_validate_rejects_bad_recipient() {
        let mut pk = Account::generate("a1", "Alice", "alice@example.com").public_key();
        pk.validate().unwrap();

        pk.encryption = "not-an-age-recipient".to_string();
        assert!(matches!(pk.validate(), Err(CryptoError::InvalidPublicKey(_))));
    }

    #[test]
    fn test_key_file_roundtrip() {
        let account = Account::generate("a1", "Alice", "alice@example.com");
        let file = account.to_key_file();
        assert!(file.encryption_key.starts_with("AGE-SECRET-KEY-"));

        let restored = Account::from_key_file(&file).unwrap();
        assert_eq!(restored.id, "a1");
        assert_eq!(restored.public_key(), account.public_key());
    }

    #[test]
    fn test_key_file_rejects_garbage() {
        let mut file = Account::generate("a1", "Alice", "alice@example.com").to_key_file();
        file.encryption_key = "nope".to_string();
        assert!(matches!(
            Account::from_key_file(&file),
            Err(CryptoError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let pk = Account::generate("a1", "Alice", "alice@example.com").public_key();
        assert_eq!(pk.fingerprint(), pk.fingerprint());
        assert_eq!(pk.fingerprint().split(':').count(), 8);
    }

    #[test]
    fn test_debug_hides_keys() {
        let account = Account::generate("a1", "Alice", "alice@example.com");
        let debug = format!("{:?}", account);
        assert!(debug.contains("alice@example.com"));
        assert!(!debug.contains("AGE-SECRET-KEY"));
    }
}
