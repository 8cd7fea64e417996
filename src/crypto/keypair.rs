//! Per-owner RSA keypair.
//!
//! A [`Keypair`] ties an owner identity to its key material. The material is
//! an explicit state: nothing loaded, a remote party's public key only, or a
//! full private key from which everything else is derived.

use crate::crypto::encoding::{key_id_for, magic_key, PublicKeyDescriptor};
use crate::crypto::rsa::{
    generate_rsa_private_key, parse_private_pem, parse_public_pem, private_key_to_pem,
    public_key_to_pem, sign_sha256, verify_sha256, DEFAULT_KEY_BITS,
};
use crate::error::{KeyError, Result};
use ::rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;

/// Key material held by a [`Keypair`].
///
/// `Debug` prints only the variant name.
#[derive(Clone, PartialEq)]
pub enum KeyMaterial {
    /// No key loaded yet.
    Unloaded,

    /// Public key of a remote party. No private half.
    PublicOnly {
        public: RsaPublicKey,
        public_pem: String,
    },

    /// Private key with its derived public half.
    Full {
        private: RsaPrivateKey,
        public: RsaPublicKey,
        private_pem: String,
        public_pem: String,
    },
}

impl KeyMaterial {
    fn from_private(private: RsaPrivateKey, private_pem: String) -> Result<Self> {
        let public = private.to_public_key();
        let public_pem = public_key_to_pem(&public)?;
        Ok(Self::Full {
            private,
            public,
            private_pem,
            public_pem,
        })
    }

    fn public(&self) -> Option<&RsaPublicKey> {
        match self {
            Self::Unloaded => None,
            Self::PublicOnly { public, .. } | Self::Full { public, .. } => Some(public),
        }
    }

    fn public_pem(&self) -> Option<&str> {
        match self {
            Self::Unloaded => None,
            Self::PublicOnly { public_pem, .. } | Self::Full { public_pem, .. } => {
                Some(public_pem)
            }
        }
    }
}

/// An owner identity and its signing key.
#[derive(Debug, Clone, PartialEq)]
pub struct Keypair {
    owner: String,
    material: KeyMaterial,
}

impl Keypair {
    /// Create a keypair for `owner` with no key loaded.
    pub fn new(owner: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        if owner.is_empty() {
            return Err(KeyError::InvalidOwnerError(
                "Owner must not be empty".to_string(),
            ));
        }

        Ok(Self {
            owner,
            material: KeyMaterial::Unloaded,
        })
    }

    /// Create a keypair holding a freshly generated default-strength key.
    pub fn generated(owner: impl Into<String>) -> Result<Self> {
        let mut keypair = Self::new(owner)?;
        keypair.generate()?;
        Ok(keypair)
    }

    /// Create a keypair from a stored private key PEM.
    pub fn from_private_pem(owner: impl Into<String>, pem: &str) -> Result<Self> {
        let mut keypair = Self::new(owner)?;
        keypair.load_private(pem)?;
        Ok(keypair)
    }

    /// Create a public-only keypair from a descriptor found in a remote actor document.
    pub fn from_descriptor(descriptor: &PublicKeyDescriptor) -> Result<Self> {
        let mut keypair = Self::new(descriptor.owner.clone())?;
        keypair.load_public(&descriptor.public_key_pem)?;
        Ok(keypair)
    }

    /// Replace the key material with a bare public key. Private material is dropped.
    pub fn load_public(&mut self, pem: &str) -> Result<()> {
        let public = parse_public_pem(pem)?;
        self.material = KeyMaterial::PublicOnly {
            public,
            public_pem: pem.to_string(),
        };
        Ok(())
    }

    /// Replace the key material with a private key and its derived public half.
    pub fn load_private(&mut self, pem: &str) -> Result<()> {
        let private = parse_private_pem(pem)?;
        self.material = KeyMaterial::from_private(private, pem.to_string())?;
        Ok(())
    }

    /// Replace the key material with a new 2048-bit key.
    pub fn generate(&mut self) -> Result<()> {
        self.generate_with_bits(DEFAULT_KEY_BITS)
    }

    /// Replace the key material with a new key of `bits` strength.
    pub fn generate_with_bits(&mut self, bits: usize) -> Result<()> {
        let private = generate_rsa_private_key(bits)?;
        let private_pem = private_key_to_pem(&private)?;
        self.material = KeyMaterial::from_private(private, private_pem)?;
        Ok(())
    }

    /// Owner identity this keypair belongs to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Current key material.
    pub fn material(&self) -> &KeyMaterial {
        &self.material
    }

    /// `"<owner>#main-key"`.
    pub fn key_id(&self) -> String {
        key_id_for(&self.owner)
    }

    /// Whether any key (public or private) is loaded.
    pub fn is_loaded(&self) -> bool {
        !matches!(self.material, KeyMaterial::Unloaded)
    }

    /// Whether the private half is present.
    pub fn has_private_key(&self) -> bool {
        matches!(self.material, KeyMaterial::Full { .. })
    }

    /// Parsed public key. Fails with `KeyNotLoadedError` when nothing is loaded.
    pub fn public_key(&self) -> Result<&RsaPublicKey> {
        self.material
            .public()
            .ok_or_else(|| self.not_loaded("no public key"))
    }

    /// Public key PEM (SubjectPublicKeyInfo, or the text given to `load_public`).
    pub fn public_pem(&self) -> Result<&str> {
        self.material
            .public_pem()
            .ok_or_else(|| self.not_loaded("no public key"))
    }

    /// Private key PEM. Fails with `KeyNotLoadedError` unless the private half is present.
    pub fn private_pem(&self) -> Result<&str> {
        match &self.material {
            KeyMaterial::Full { private_pem, .. } => Ok(private_pem),
            _ => Err(self.not_loaded("no private key")),
        }
    }

    /// Public key fragment for the owner's actor document.
    pub fn to_descriptor(&self) -> Result<PublicKeyDescriptor> {
        Ok(PublicKeyDescriptor {
            id: self.key_id(),
            owner: self.owner.clone(),
            public_key_pem: self.public_pem()?.to_string(),
        })
    }

    /// Magic key encoding of the public half.
    ///
    /// Only modulus and exponent are needed, so public-only keypairs succeed too.
    pub fn to_magic_key(&self) -> Result<String> {
        Ok(magic_key(self.public_key()?))
    }

    /// Sign a message with RSA-SHA256 (PKCS#1 v1.5).
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match &self.material {
            KeyMaterial::Full { private, .. } => sign_sha256(private, message),
            _ => Err(self.not_loaded("signing requires a private key")),
        }
    }

    /// Verify an RSA-SHA256 signature against the public half.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        verify_sha256(self.public_key()?, message, signature)
    }

    fn not_loaded(&self, what: &str) -> KeyError {
        KeyError::KeyNotLoadedError(format!("{} for owner '{}'", what, self.owner))
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unloaded => "Unloaded",
            Self::PublicOnly { .. } => "PublicOnly",
            Self::Full { .. } => "Full",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encoding::MAGIC_KEY_PREFIX;
    use ::rsa::traits::PublicKeyParts;

    const TEST_BITS: usize = 1024;

    fn test_keypair(owner: &str) -> Keypair {
        let mut keypair = Keypair::new(owner).unwrap();
        keypair.generate_with_bits(TEST_BITS).unwrap();
        keypair
    }

    #[test]
    fn test_new_rejects_empty_owner() {
        match Keypair::new("") {
            Err(KeyError::InvalidOwnerError(_)) => {}
            _ => panic!("Expected InvalidOwnerError"),
        }
    }

    #[test]
    fn test_new_is_unloaded() {
        let keypair = Keypair::new("alice").unwrap();

        assert!(!keypair.is_loaded());
        assert!(!keypair.has_private_key());
        assert_eq!(keypair.material(), &KeyMaterial::Unloaded);
    }

    #[test]
    fn test_key_id() {
        let keypair = Keypair::new("https://example.com/users/alice").unwrap();
        assert_eq!(keypair.key_id(), "https://example.com/users/alice#main-key");
    }

    #[test]
    fn test_generate_default_strength() {
        let keypair = Keypair::generated("alice").unwrap();

        assert!(keypair.has_private_key());
        assert_eq!(keypair.public_key().unwrap().n().bits(), DEFAULT_KEY_BITS);
    }

    #[test]
    fn test_generate_produces_different_keys() {
        let first = test_keypair("alice");
        let second = test_keypair("alice");

        assert_ne!(first.public_pem().unwrap(), second.public_pem().unwrap());
    }

    #[test]
    fn test_load_private_reproduces_public_pem() {
        let original = test_keypair("alice");

        let mut reloaded = Keypair::new("alice").unwrap();
        reloaded
            .load_private(original.private_pem().unwrap())
            .unwrap();

        assert_eq!(reloaded.public_pem().unwrap(), original.public_pem().unwrap());
        assert_eq!(reloaded.private_pem().unwrap(), original.private_pem().unwrap());
        assert_eq!(reloaded, original);
    }

    #[test]
    fn test_load_private_invalid() {
        let mut keypair = Keypair::new("alice").unwrap();

        match keypair.load_private("not a key") {
            Err(KeyError::KeyFormatError(_)) => {}
            _ => panic!("Expected KeyFormatError"),
        }
        assert!(!keypair.is_loaded());
    }

    #[test]
    fn test_load_public_clears_private() {
        let remote = test_keypair("bob");
        let mut keypair = test_keypair("bob");

        keypair.load_public(remote.public_pem().unwrap()).unwrap();

        assert!(keypair.is_loaded());
        assert!(!keypair.has_private_key());
        assert_eq!(keypair.public_pem().unwrap(), remote.public_pem().unwrap());
    }

    #[test]
    fn test_load_public_invalid_keeps_state() {
        let mut keypair = test_keypair("bob");
        let before = keypair.clone();

        match keypair.load_public("-----BEGIN PUBLIC KEY-----\n-----END PUBLIC KEY-----") {
            Err(KeyError::KeyFormatError(_)) => {}
            _ => panic!("Expected KeyFormatError"),
        }
        assert_eq!(keypair, before);
    }

    #[test]
    fn test_descriptor_matches_private_key() {
        let keypair = test_keypair("https://example.com/users/alice");
        let descriptor = keypair.to_descriptor().unwrap();

        assert_eq!(descriptor.id, "https://example.com/users/alice#main-key");
        assert_eq!(descriptor.owner, "https://example.com/users/alice");

        let reparsed = parse_public_pem(&descriptor.public_key_pem).unwrap();
        let KeyMaterial::Full { private, .. } = keypair.material() else {
            panic!("Expected full key material");
        };
        assert_eq!(reparsed.n(), private.n());
        assert_eq!(reparsed.e(), private.e());
    }

    #[test]
    fn test_descriptor_requires_key() {
        let keypair = Keypair::new("alice").unwrap();

        match keypair.to_descriptor() {
            Err(KeyError::KeyNotLoadedError(_)) => {}
            _ => panic!("Expected KeyNotLoadedError"),
        }
    }

    #[test]
    fn test_from_descriptor_is_public_only() {
        let local = test_keypair("https://remote.example/users/carol");
        let descriptor = local.to_descriptor().unwrap();

        let remote = Keypair::from_descriptor(&descriptor).unwrap();

        assert_eq!(remote.owner(), local.owner());
        assert!(!remote.has_private_key());
        assert_eq!(remote.to_descriptor().unwrap(), descriptor);
    }

    #[test]
    fn test_magic_key_format() {
        let keypair = test_keypair("alice");
        let magic = keypair.to_magic_key().unwrap();

        let rest = magic.strip_prefix(MAGIC_KEY_PREFIX).unwrap();
        let segments: Vec<&str> = rest.split('.').collect();
        assert_eq!(segments.len(), 2);
        for segment in &segments {
            assert!(!segment.is_empty());
            assert!(segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='));
        }
        assert_eq!(segments[1], "AQAB");
    }

    #[test]
    fn test_magic_key_public_only_succeeds() {
        let local = test_keypair("alice");
        let mut remote = Keypair::new("alice").unwrap();
        remote.load_public(local.public_pem().unwrap()).unwrap();

        assert_eq!(remote.to_magic_key().unwrap(), local.to_magic_key().unwrap());
    }

    #[test]
    fn test_magic_key_requires_key() {
        let keypair = Keypair::new("alice").unwrap();

        match keypair.to_magic_key() {
            Err(KeyError::KeyNotLoadedError(_)) => {}
            _ => panic!("Expected KeyNotLoadedError"),
        }
    }

    #[test]
    fn test_public_only_rejects_private_operations() {
        let local = test_keypair("alice");
        let mut remote = Keypair::new("alice").unwrap();
        remote.load_public(local.public_pem().unwrap()).unwrap();

        assert!(matches!(
            remote.private_pem(),
            Err(KeyError::KeyNotLoadedError(_))
        ));
        assert!(matches!(
            remote.sign(b"message"),
            Err(KeyError::KeyNotLoadedError(_))
        ));
    }

    #[test]
    fn test_sign_and_verify_across_keypairs() {
        let local = test_keypair("alice");
        let remote = Keypair::from_descriptor(&local.to_descriptor().unwrap()).unwrap();
        let message = b"date: Mon, 19 Oct 2026 10:00:00 GMT";

        let signature = local.sign(message).unwrap();

        assert!(remote.verify(message, &signature).is_ok());
        assert!(matches!(
            remote.verify(b"other", &signature),
            Err(KeyError::CryptoError(_))
        ));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let keypair = test_keypair("alice");
        let debug = format!("{:?}", keypair);

        assert!(debug.contains("alice"));
        assert!(debug.contains("Full"));
        assert!(!debug.contains("PRIVATE"));
    }
}
