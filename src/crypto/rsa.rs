//! RSA key operations.
//!
//! Thin wrappers around the `rsa` crate that fix the encodings used on the
//! wire and on disk: private keys are written as PKCS#1 PEM, public keys as
//! SubjectPublicKeyInfo PEM, both with LF line endings.

use crate::error::{KeyError, Result};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// Strength of freshly generated keys, in bits.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Smallest modulus accepted for generation.
pub const MIN_KEY_BITS: usize = 1024;

/// Generate a new RSA private key from the operating system's CSPRNG.
///
/// # Example
///
/// ```no_run
/// use actorkeys::crypto::rsa::{generate_rsa_private_key, key_bits, DEFAULT_KEY_BITS};
///
/// let key = generate_rsa_private_key(DEFAULT_KEY_BITS).unwrap();
/// assert_eq!(key_bits(&key.to_public_key()), 2048);
/// ```
pub fn generate_rsa_private_key(bits: usize) -> Result<RsaPrivateKey> {
    if bits < MIN_KEY_BITS {
        return Err(KeyError::CryptoError(format!(
            "RSA keys must be at least {} bits, got {}",
            MIN_KEY_BITS, bits
        )));
    }

    RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| KeyError::CryptoError(format!("Failed to generate RSA key: {}", e)))
}

/// Parse a private key from PEM, accepting PKCS#1 and PKCS#8 framing.
pub fn parse_private_pem(pem: &str) -> Result<RsaPrivateKey> {
    let pem = pem.trim();
    if let Ok(key) = RsaPrivateKey::from_pkcs1_pem(pem) {
        return Ok(key);
    }

    RsaPrivateKey::from_pkcs8_pem(pem)
        .map_err(|e| KeyError::KeyFormatError(format!("Not an RSA private key PEM: {}", e)))
}

/// Parse a public key from PEM, accepting SubjectPublicKeyInfo and PKCS#1 framing.
pub fn parse_public_pem(pem: &str) -> Result<RsaPublicKey> {
    let pem = pem.trim();
    if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
        return Ok(key);
    }

    RsaPublicKey::from_pkcs1_pem(pem)
        .map_err(|e| KeyError::KeyFormatError(format!("Not an RSA public key PEM: {}", e)))
}

/// Serialize a private key as PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`).
pub fn private_key_to_pem(key: &RsaPrivateKey) -> Result<String> {
    let pem = key
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| KeyError::CryptoError(format!("Failed to encode private key: {}", e)))?;
    Ok(pem.as_str().to_owned())
}

/// Serialize a public key as SubjectPublicKeyInfo PEM (`BEGIN PUBLIC KEY`).
pub fn public_key_to_pem(key: &RsaPublicKey) -> Result<String> {
    key.to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeyError::CryptoError(format!("Failed to encode public key: {}", e)))
}

/// Modulus size in bits.
pub fn key_bits(key: &RsaPublicKey) -> usize {
    key.n().bits()
}

/// Sign `message` with RSASSA-PKCS1-v1_5 over SHA-256.
pub fn sign_sha256(key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    let hashed = Sha256::digest(message);
    key.sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)
        .map_err(|e| KeyError::CryptoError(format!("RSA signing failed: {}", e)))
}

/// Verify an RSASSA-PKCS1-v1_5 / SHA-256 signature.
pub fn verify_sha256(key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let hashed = Sha256::digest(message);
    key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        .map_err(|e| KeyError::CryptoError(format!("Signature verification failed: {}", e)))
}
