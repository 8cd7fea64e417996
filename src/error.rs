//! Error types for the actorkeys library.
//!
//! Every fallible operation in the crate returns [`KeyError`]. Callers map
//! these into their own protocol-level responses; nothing here retries.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for key operations.
#[derive(Error, Debug)]
pub enum KeyError {
    /// PEM text could not be parsed as a key of the expected kind
    #[error("Invalid key format: {0}")]
    KeyFormatError(String),

    /// The operation needs key material that has not been loaded
    #[error("Key not loaded: {0}")]
    KeyNotLoadedError(String),

    /// Reading or writing a key file failed
    #[error("Key persistence failed for {}: {source}", .path.display())]
    PersistenceError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Owner identity is unusable
    #[error("Invalid owner: {0}")]
    InvalidOwnerError(String),

    /// RSA generation, encoding, signing or verification failed
    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    /// Configuration could not be read or is out of range
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl KeyError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PersistenceError {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;
