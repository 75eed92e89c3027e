//! Cryptographic provider and key types
//!
//! The organization never touches a signature scheme directly. Key
//! generation, signing and verification go through a [`CryptoProvider`], so
//! the lifecycle code only owns the usage protocol (what gets signed, by whom
//! and when).

mod keys;
pub(crate) mod provider;
mod symmetric;

pub use keys::{GeneratedKeyPair, SecretKey};
pub use provider::{CryptoProvider, Ed25519Provider, SignatureAlgorithm, SigningParams};
pub use symmetric::{SealedData, SymmetricKey, KEY_SIZE, NONCE_SIZE};

use thiserror::Error;

/// Crypto-related errors
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key bytes have the wrong length or encoding
    #[error("Invalid key: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Private key could not be parsed
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Public key bytes are not a valid point
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Signature bytes are malformed
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    /// Authenticated encryption failed
    #[error("Sealing failed")]
    SealFailed,

    /// Authenticated decryption failed (wrong key or tampered data)
    #[error("Opening sealed data failed")]
    OpenFailed,
}
