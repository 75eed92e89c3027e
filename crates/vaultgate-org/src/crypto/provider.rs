//! Crypto provider trait and the Ed25519 implementation

use async_trait::async_trait;
use ed25519_dalek::{Signer, Verifier};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keys::{GeneratedKeyPair, SecretKey};
use super::symmetric::SymmetricKey;
use super::CryptoError;

/// Signature scheme used for member attestations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureAlgorithm {
    /// Ed25519 (RFC 8032)
    #[default]
    Ed25519,
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ed25519 => write!(f, "ed25519"),
        }
    }
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ed25519" => Ok(Self::Ed25519),
            _ => Err(format!("Unknown signature algorithm: {}. Valid: ed25519", s)),
        }
    }
}

/// Signing parameters stored on the organization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningParams {
    /// Signature algorithm
    pub algorithm: SignatureAlgorithm,
}

impl SigningParams {
    /// Parameters for the given algorithm
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self { algorithm }
    }
}

/// Trait for cryptographic providers
///
/// Every call is a potential suspension point; hardware-backed or remote
/// providers can implement it without blocking the caller.
#[async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Generate a signing keypair for the given parameters
    async fn generate_signing_key(
        &self,
        params: &SigningParams,
    ) -> Result<GeneratedKeyPair, CryptoError>;

    /// Generate a random symmetric key
    async fn generate_symmetric_key(&self) -> Result<SymmetricKey, CryptoError>;

    /// Sign `message` with `private_key`
    async fn sign(
        &self,
        private_key: &SecretKey,
        message: &[u8],
        params: &SigningParams,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Check `signature` over `message` against `public_key`.
    ///
    /// A well-formed signature that does not match returns `Ok(false)`;
    /// malformed keys or signatures are errors.
    async fn verify(
        &self,
        public_key: &[u8],
        signature: &[u8],
        message: &[u8],
        params: &SigningParams,
    ) -> Result<bool, CryptoError>;
}

/// Software Ed25519 provider backed by `ed25519-dalek`
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

impl Ed25519Provider {
    /// Create a new provider
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn signing_key_from_bytes(bytes: &[u8]) -> Result<ed25519_dalek::SigningKey, CryptoError> {
    let arr: [u8; ed25519_dalek::SECRET_KEY_LENGTH] =
        bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: ed25519_dalek::SECRET_KEY_LENGTH,
            actual: bytes.len(),
        })?;
    Ok(ed25519_dalek::SigningKey::from_bytes(&arr))
}

pub(crate) fn verifying_key_from_bytes(
    bytes: &[u8],
) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
    let arr: [u8; ed25519_dalek::PUBLIC_KEY_LENGTH] =
        bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: ed25519_dalek::PUBLIC_KEY_LENGTH,
            actual: bytes.len(),
        })?;
    ed25519_dalek::VerifyingKey::from_bytes(&arr)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}

#[async_trait]
impl CryptoProvider for Ed25519Provider {
    fn name(&self) -> &str {
        "ed25519-dalek"
    }

    async fn generate_signing_key(
        &self,
        params: &SigningParams,
    ) -> Result<GeneratedKeyPair, CryptoError> {
        match params.algorithm {
            SignatureAlgorithm::Ed25519 => {
                let sk = ed25519_dalek::SigningKey::generate(&mut OsRng);
                let public_key = sk.verifying_key().to_bytes().to_vec();
                debug!(algorithm = %params.algorithm, "generated signing keypair");
                Ok(GeneratedKeyPair {
                    public_key,
                    private_key: SecretKey::new(sk.to_bytes().to_vec()),
                })
            }
        }
    }

    async fn generate_symmetric_key(&self) -> Result<SymmetricKey, CryptoError> {
        Ok(SymmetricKey::generate())
    }

    async fn sign(
        &self,
        private_key: &SecretKey,
        message: &[u8],
        params: &SigningParams,
    ) -> Result<Vec<u8>, CryptoError> {
        match params.algorithm {
            SignatureAlgorithm::Ed25519 => {
                let sk = signing_key_from_bytes(private_key.expose())?;
                Ok(sk.sign(message).to_bytes().to_vec())
            }
        }
    }

    async fn verify(
        &self,
        public_key: &[u8],
        signature: &[u8],
        message: &[u8],
        params: &SigningParams,
    ) -> Result<bool, CryptoError> {
        match params.algorithm {
            SignatureAlgorithm::Ed25519 => {
                let pk = verifying_key_from_bytes(public_key)?;
                let sig = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
                Ok(pk.verify(message, &sig).is_ok())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_verify() {
        let provider = Ed25519Provider::new();
        let params = SigningParams::default();
        let keys = provider.generate_signing_key(&params).await.unwrap();

        let sig = provider
            .sign(&keys.private_key, b"hello", &params)
            .await
            .unwrap();
        assert_eq!(sig.len(), 64);
        assert!(provider
            .verify(&keys.public_key, &sig, b"hello", &params)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_other_message() {
        let provider = Ed25519Provider::new();
        let params = SigningParams::default();
        let keys = provider.generate_signing_key(&params).await.unwrap();

        let sig = provider
            .sign(&keys.private_key, b"hello", &params)
            .await
            .unwrap();
        assert!(!provider
            .verify(&keys.public_key, &sig, b"goodbye", &params)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_other_key() {
        let provider = Ed25519Provider::new();
        let params = SigningParams::default();
        let keys = provider.generate_signing_key(&params).await.unwrap();
        let other = provider.generate_signing_key(&params).await.unwrap();

        let sig = provider
            .sign(&keys.private_key, b"hello", &params)
            .await
            .unwrap();
        assert!(!provider
            .verify(&other.public_key, &sig, b"hello", &params)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_malformed_inputs_are_errors() {
        let provider = Ed25519Provider::new();
        let params = SigningParams::default();
        let keys = provider.generate_signing_key(&params).await.unwrap();

        let short_key = provider.verify(&[0u8; 5], &[0u8; 64], b"m", &params).await;
        assert!(matches!(
            short_key,
            Err(CryptoError::InvalidKeyLength { expected: 32, .. })
        ));

        let short_sig = provider.verify(&keys.public_key, &[0u8; 10], b"m", &params).await;
        assert!(matches!(short_sig, Err(CryptoError::InvalidSignature(_))));
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!(
            "ED25519".parse::<SignatureAlgorithm>().unwrap(),
            SignatureAlgorithm::Ed25519
        );
        assert!("rsa-pss".parse::<SignatureAlgorithm>().is_err());
    }
}
