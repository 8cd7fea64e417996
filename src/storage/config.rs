//! Key storage configuration.
//!
//! Where key files live and how strong new keys are. Loaded from TOML or
//! built directly; the CLI layers its flags on top.

use crate::crypto::rsa::{DEFAULT_KEY_BITS, MIN_KEY_BITS};
use crate::error::{KeyError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default key storage directory, relative to the working directory.
pub const DEFAULT_KEY_DIR: &str = "keys";

/// Configuration for a [`KeyStore`](crate::storage::keystore::KeyStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyStoreConfig {
    /// Directory holding one `key_<owner>.pem` file per owner.
    pub key_dir: PathBuf,

    /// Modulus size for newly generated keys.
    pub key_bits: usize,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            key_dir: PathBuf::from(DEFAULT_KEY_DIR),
            key_bits: DEFAULT_KEY_BITS,
        }
    }
}

impl KeyStoreConfig {
    /// Configuration for `key_dir` with default key strength.
    pub fn new(key_dir: impl Into<PathBuf>) -> Self {
        Self {
            key_dir: key_dir.into(),
            ..Self::default()
        }
    }

    /// Set the modulus size for newly generated keys.
    pub fn with_key_bits(mut self, key_bits: usize) -> Self {
        self.key_bits = key_bits;
        self
    }

    /// Parse and validate a TOML document.
    ///
    /// ```
    /// use actorkeys::storage::config::KeyStoreConfig;
    ///
    /// let config = KeyStoreConfig::from_toml_str("key_dir = \"/var/lib/actorkeys\"").unwrap();
    /// assert_eq!(config.key_bits, 2048);
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| KeyError::ConfigError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            KeyError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check that `key_dir` is set and `key_bits` is at least 1024.
    pub fn validate(&self) -> Result<()> {
        if self.key_dir.as_os_str().is_empty() {
            return Err(KeyError::ConfigError(
                "key_dir must not be empty".to_string(),
            ));
        }

        if self.key_bits < MIN_KEY_BITS {
            return Err(KeyError::ConfigError(format!(
                "key_bits must be at least {}, got {}",
                MIN_KEY_BITS, self.key_bits
            )));
        }

        Ok(())
    }
}
