//! actorkeys: per-actor signing keys for federated protocols
//!
//! Every actor (identified by an owner string such as an account handle or
//! actor URL) gets one RSA keypair, generated on first use and cached on disk.
//! The library then produces the forms other protocol layers need:
//!
//! - PEM text for the private and public halves
//! - The `publicKey` descriptor embedded in actor documents
//! - The `data:application/magic-public-key` value used by discovery
//! - RSA-SHA256 signatures over request material
//!
//! # Example
//!
//! ```rust,no_run
//! use actorkeys::storage::config::KeyStoreConfig;
//! use actorkeys::storage::keystore::{get_or_create, KeyStore};
//! use actorkeys::error::Result;
//!
//! fn example() -> Result<()> {
//!     let keystore = KeyStore::new(KeyStoreConfig::new("keys"))?;
//!     let keypair = get_or_create(&keystore, "https://example.com/users/alice")?;
//!     println!("{}", serde_json::to_string_pretty(&keypair.to_descriptor()?)?);
//!     Ok(())
//! }
//! ```

pub mod crypto;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use crypto::encoding::PublicKeyDescriptor;
pub use crypto::keypair::{KeyMaterial, Keypair};
pub use error::{KeyError, Result};
pub use storage::config::KeyStoreConfig;
pub use storage::keystore::{get_or_create, KeyStore};
