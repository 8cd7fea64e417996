//! Cryptographic operations module.
//!
//! This module provides the key material side of actorkeys:
//!
//! - RSA key generation, PEM parsing and serialization, signing
//! - The per-owner [`Keypair`](keypair::Keypair)
//! - Actor descriptor and magic key encodings
//!
//! # Example
//!
//! ```rust,no_run
//! use actorkeys::crypto::keypair::Keypair;
//!
//! # fn example() -> actorkeys::error::Result<()> {
//! let keypair = Keypair::generated("https://example.com/users/alice")?;
//!
//! let descriptor = keypair.to_descriptor()?;
//! assert_eq!(descriptor.id, "https://example.com/users/alice#main-key");
//!
//! let magic = keypair.to_magic_key()?;
//! assert!(magic.starts_with("data:application/magic-public-key,RSA."));
//! # Ok(())
//! # }
//! ```

pub mod encoding;
pub mod keypair;
pub mod rsa;
