//! Age-backed key container

use std::io::{Read, Write};

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::{Accessor, ContainerError, KeyContainer};
use crate::account::Account;

/// Payload encrypted for every accessor's age recipient.
///
/// Only the accessor list and the armored ciphertext are serialized.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AgeContainer {
    accessors: Vec<Accessor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    encrypted_data: Option<String>,

    #[serde(skip)]
    data: Option<Zeroizing<Vec<u8>>>,
}

impl AgeContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Armored ciphertext, if any
    pub fn encrypted_data(&self) -> Option<&str> {
        self.encrypted_data.as_deref()
    }
}

/// Encrypt `data` to every accessor. Fails before writing anything if a
/// recipient does not parse.
fn seal(data: &[u8], accessors: &[Accessor]) -> Result<String, ContainerError> {
    if accessors.is_empty() {
        return Err(ContainerError::NoAccessors);
    }
    let recipients = accessors
        .iter()
        .map(|a| {
            a.public_key
                .recipient()
                .map(|r| Box::new(r) as Box<dyn age::Recipient + Send>)
                .map_err(|e| ContainerError::InvalidRecipient {
                    accessor: a.id.clone(),
                    reason: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let encryptor = age::Encryptor::with_recipients(recipients)
        .ok_or(ContainerError::NoAccessors)?;
    let encrypt_err = |e: std::io::Error| ContainerError::Encryption(e.to_string());

    let mut armored = Vec::new();
    let mut writer = encryptor
        .wrap_output(ArmoredWriter::wrap_output(&mut armored, Format::AsciiArmor).map_err(encrypt_err)?)
        .map_err(|e| ContainerError::Encryption(e.to_string()))?;
    writer.write_all(data)?;
    writer.finish().and_then(|armor| armor.finish()).map_err(encrypt_err)?;

    String::from_utf8(armored).map_err(|e| ContainerError::Encryption(e.to_string()))
}

/// Decrypt an armored payload with the account's age identity
fn open(armored: &str, identity: &age::x25519::Identity) -> Result<Zeroizing<Vec<u8>>, ContainerError> {
    let decryptor = match age::Decryptor::new(ArmoredReader::new(armored.as_bytes())) {
        Ok(age::Decryptor::Recipients(d)) => d,
        Ok(_) => {
            return Err(ContainerError::Decryption(
                "payload is passphrase-encrypted".to_string(),
            ))
        }
        Err(e) => return Err(ContainerError::Decryption(e.to_string())),
    };

    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .map_err(|e| ContainerError::Decryption(e.to_string()))?;
    let mut data = Zeroizing::new(Vec::new());
    reader.read_to_end(&mut data)?;
    Ok(data)
}

impl std::fmt::Debug for AgeContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgeContainer")
            .field("accessors", &self.accessors)
            .field("has_data", &self.encrypted_data.is_some())
            .field("unlocked", &self.data.is_some())
            .finish()
    }
}

#[async_trait]
impl KeyContainer for AgeContainer {
    async fn unlock(&mut self, account: &Account) -> Result<(), ContainerError> {
        if !self.accessors.iter().any(|a| a.id == account.id) {
            return Err(ContainerError::NotAnAccessor(account.id.clone()));
        }
        let encrypted = self.encrypted_data.as_ref().ok_or(ContainerError::Empty)?;
        self.data = Some(open(encrypted, account.encryption_identity())?);
        debug!(account = %account.id, "unlocked container");
        Ok(())
    }

    fn lock(&mut self) {
        self.data = None;
    }

    fn is_unlocked(&self) -> bool {
        self.data.is_some()
    }

    async fn update_accessors(&mut self, accessors: Vec<Accessor>) -> Result<(), ContainerError> {
        if accessors.is_empty() {
            return Err(ContainerError::NoAccessors);
        }
        if self.encrypted_data.is_some() && self.data.is_none() {
            return Err(ContainerError::Locked);
        }

        if let Some(data) = &self.data {
            self.encrypted_data = Some(seal(data, &accessors)?);
        }
        self.accessors = accessors;
        debug!(count = self.accessors.len(), "updated container accessors");
        Ok(())
    }

    async fn set_data(&mut self, data: &[u8]) -> Result<(), ContainerError> {
        self.encrypted_data = Some(seal(data, &self.accessors)?);
        self.data = Some(Zeroizing::new(data.to_vec()));
        Ok(())
    }

    async fn get_data(&self) -> Result<Zeroizing<Vec<u8>>, ContainerError> {
        self.data.clone().ok_or(ContainerError::Locked)
    }

    fn clear(&mut self) {
        self.encrypted_data = None;
        self.data = None;
    }

    fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }
}
