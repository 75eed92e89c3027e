//! XChaCha20-Poly1305 sealing with the organization invites key.
//!
//! Nonces are 192 bits and randomly generated, so a fresh nonce per seal is
//! safe without any counter state.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::CryptoError;
use crate::encoding::base64_serde;

/// Size of symmetric key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// Size of nonce in bytes (192 bits for XChaCha20).
pub const NONCE_SIZE: usize = 24;

/// A 256-bit symmetric key, zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Get the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Encrypt and authenticate `plaintext` under this key
    pub fn seal(&self, plaintext: &[u8]) -> Result<SealedData, CryptoError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.bytes));

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::SealFailed)?;

        Ok(SealedData {
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }

    /// Decrypt data produced by [`SymmetricKey::seal`]
    pub fn open(&self, sealed: &SealedData) -> Result<Vec<u8>, CryptoError> {
        if sealed.nonce.len() != NONCE_SIZE {
            return Err(CryptoError::OpenFailed);
        }
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.bytes));
        cipher
            .decrypt(XNonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
            .map_err(|_| CryptoError::OpenFailed)
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// Ciphertext plus the nonce it was sealed with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedData {
    /// Random 24-byte nonce
    #[serde(with = "base64_serde")]
    pub nonce: Vec<u8>,
    /// Ciphertext with the Poly1305 tag appended
    #[serde(with = "base64_serde")]
    pub ciphertext: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = SymmetricKey::generate();
        let sealed = key.seal(b"invite secret").unwrap();
        assert_eq!(sealed.nonce.len(), NONCE_SIZE);
        assert_eq!(key.open(&sealed).unwrap(), b"invite secret");
    }

    #[test]
    fn test_wrong_key_fails() {
        let key = SymmetricKey::generate();
        let other = SymmetricKey::generate();
        let sealed = key.seal(b"secret").unwrap();
        assert!(matches!(other.open(&sealed), Err(CryptoError::OpenFailed)));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SymmetricKey::generate();
        let mut sealed = key.seal(b"secret").unwrap();
        sealed.ciphertext[0] ^= 0xff;
        assert!(key.open(&sealed).is_err());
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert!(matches!(
            SymmetricKey::from_bytes(&[0u8; 16]),
            Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 16
            })
        ));
    }
}
