//! Key material containers
//!
//! A container protects an opaque payload for a set of accessors. Only
//! accounts in the accessor set can unlock it; changing the set re-wraps the
//! payload for exactly the new accessors.

mod age_container;

pub use age_container::AgeContainer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::account::{Account, AccountPublicKey};

/// Container-related errors
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The account is not in the accessor set
    #[error("Account '{0}' is not an accessor of this container")]
    NotAnAccessor(String),

    /// Payload requested or re-wrapped while locked
    #[error("Container is locked")]
    Locked,

    /// Nothing has been stored yet
    #[error("Container holds no data")]
    Empty,

    /// Accessor set is empty
    #[error("Container needs at least one accessor")]
    NoAccessors,

    /// An accessor's age recipient does not parse
    #[error("Accessor '{accessor}' has an invalid recipient: {reason}")]
    InvalidRecipient { accessor: String, reason: String },

    /// Wrapping the payload failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Unwrapping the payload failed
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An entity entitled to decrypt a container payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessor {
    /// Account id
    pub id: String,

    /// Account public key
    pub public_key: AccountPublicKey,
}

/// Trait for key material containers.
///
/// Every fallible operation either succeeds completely or leaves the
/// container as it was.
#[async_trait]
pub trait KeyContainer: Clone + Send + Sync {
    /// Decrypt the payload with the given account's keys
    async fn unlock(&mut self, account: &Account) -> Result<(), ContainerError>;

    /// Drop the decrypted payload from memory
    fn lock(&mut self);

    /// Whether the decrypted payload is available
    fn is_unlocked(&self) -> bool;

    /// Replace the accessor set, revoking everyone not in `accessors`
    async fn update_accessors(&mut self, accessors: Vec<Accessor>) -> Result<(), ContainerError>;

    /// Encrypt and store `data` for the current accessors
    async fn set_data(&mut self, data: &[u8]) -> Result<(), ContainerError>;

    /// Get the decrypted payload
    async fn get_data(&self) -> Result<Zeroizing<Vec<u8>>, ContainerError>;

    /// Discard the stored payload, encrypted and decrypted
    fn clear(&mut self);

    /// Current accessor set
    fn accessors(&self) -> &[Accessor];
}
