//! Private key material

use zeroize::Zeroizing;

/// Raw private key bytes, zeroized on drop.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    /// Wrap raw private key bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Borrow the raw key bytes.
    ///
    /// Avoid logging or persisting the returned bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// A freshly generated signing keypair
#[derive(Debug, Clone)]
pub struct GeneratedKeyPair {
    /// Public key bytes, safe to publish
    pub public_key: Vec<u8>,
    /// Private key bytes
    pub private_key: SecretKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let key = SecretKey::new(vec![1, 2, 3]);
        assert_eq!(format!("{:?}", key), "SecretKey([REDACTED])");
        assert_eq!(key.expose(), &[1, 2, 3]);
    }
}
