//! Protocol-facing encodings of a public key.
//!
//! - [`PublicKeyDescriptor`]: the `publicKey` object embedded in actor documents.
//! - [`magic_key`]: the `data:application/magic-public-key` value used by
//!   discovery documents and legacy envelope signatures.

use base64::{engine::general_purpose, Engine as _};
use ::rsa::traits::PublicKeyParts;
use ::rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};

/// Literal prefix of every magic key.
pub const MAGIC_KEY_PREFIX: &str = "data:application/magic-public-key,RSA.";

/// Suffix appended to the owner to form the key id.
pub const KEY_ID_SUFFIX: &str = "#main-key";

/// Public key fragment of an actor document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyDescriptor {
    pub id: String,
    pub owner: String,
    #[serde(rename = "publicKeyPem")]
    pub public_key_pem: String,
}

/// Build the key id for an owner: `"<owner>#main-key"`.
pub fn key_id_for(owner: &str) -> String {
    format!("{}{}", owner, KEY_ID_SUFFIX)
}

/// Encode a public key as a magic key.
///
/// Modulus and exponent are written as minimal big-endian bytes, each
/// base64url-encoded separately with padding kept.
pub fn magic_key(key: &RsaPublicKey) -> String {
    let modulus = general_purpose::URL_SAFE.encode(key.n().to_bytes_be());
    let exponent = general_purpose::URL_SAFE.encode(key.e().to_bytes_be());
    format!("{}{}.{}", MAGIC_KEY_PREFIX, modulus, exponent)
}
