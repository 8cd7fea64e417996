//! File-backed keystore resolving owners to keypairs.
//!
//! Each owner has exactly one file, `key_<sanitized-owner>.pem`, holding its
//! private key in PEM form. The first retrieval for an owner generates and
//! writes the key; later retrievals read it back. Nothing is cached in memory.
//!
//! Sanitization replaces every character outside `[A-Za-z0-9_]` with `_`, so
//! distinct owners such as `a.b` and `a_b` share one file. This naming is
//! kept for compatibility with existing key directories.

use crate::crypto::keypair::Keypair;
use crate::error::{KeyError, Result};
use crate::storage::config::KeyStoreConfig;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Prefix of every key file name.
const KEY_FILE_PREFIX: &str = "key_";

/// Extension of every key file name.
const KEY_FILE_EXTENSION: &str = "pem";

/// A directory of per-owner private keys.
///
/// Retrievals for owners that map to the same file are serialized within the
/// process. Across processes, a new key only lands on disk if no other writer
/// got there first; the loser reads the winner's key.
#[derive(Debug)]
pub struct KeyStore {
    config: KeyStoreConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyStore {
    /// Create a keystore over `config.key_dir`. The directory is created lazily.
    pub fn new(config: KeyStoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Configuration this keystore was built from.
    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    /// Directory holding the key files.
    pub fn key_dir(&self) -> &Path {
        &self.config.key_dir
    }

    /// Storage path for `owner`'s private key.
    pub fn key_path(&self, owner: &str) -> PathBuf {
        self.config.key_dir.join(key_file_name(owner))
    }

    fn file_lock(&self, file_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(file_name.to_string()).or_default().clone()
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
///
/// # Example
///
/// ```
/// use actorkeys::storage::keystore::sanitize_owner;
///
/// assert_eq!(sanitize_owner("alice@example.com"), "alice_example_com");
/// ```
pub fn sanitize_owner(owner: &str) -> String {
    owner
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// File name of `owner`'s key: `key_<sanitized-owner>.pem`.
pub fn key_file_name(owner: &str) -> String {
    format!(
        "{}{}.{}",
        KEY_FILE_PREFIX,
        sanitize_owner(owner),
        KEY_FILE_EXTENSION
    )
}

/// Whether a key file exists for `owner`.
pub fn key_exists(keystore: &KeyStore, owner: &str) -> bool {
    keystore.key_path(owner).is_file()
}

/// Load `owner`'s stored key without creating one.
///
/// Returns `Ok(None)` if no key file exists.
pub fn load_key(keystore: &KeyStore, owner: &str) -> Result<Option<Keypair>> {
    read_key_file(owner, &keystore.key_path(owner))
}

/// Return `owner`'s keypair, generating and storing one on first use.
///
/// The returned keypair always holds private key material. A freshly
/// generated key is only returned once it has been written to disk.
///
/// # Example
///
/// ```rust,no_run
/// use actorkeys::storage::config::KeyStoreConfig;
/// use actorkeys::storage::keystore::{get_or_create, KeyStore};
///
/// # fn example() -> actorkeys::error::Result<()> {
/// let keystore = KeyStore::new(KeyStoreConfig::new("/var/lib/actorkeys"))?;
/// let keypair = get_or_create(&keystore, "https://example.com/users/alice")?;
/// assert_eq!(keypair.key_id(), "https://example.com/users/alice#main-key");
/// # Ok(())
/// # }
/// ```
pub fn get_or_create(keystore: &KeyStore, owner: &str) -> Result<Keypair> {
    resolve_key(keystore, owner).map(|(keypair, _)| keypair)
}

/// Like [`get_or_create`], also reporting whether this call wrote the key file.
///
/// # Arguments
///
/// * `keystore` - The keystore to resolve against
/// * `owner` - The owner identity (account handle or actor URL)
///
/// Returns the keypair and `true` if it was generated and persisted by this
/// call, `false` if it was read from an existing file.
pub fn resolve_key(keystore: &KeyStore, owner: &str) -> Result<(Keypair, bool)> {
    let mut keypair = Keypair::new(owner)?;
    let file_name = key_file_name(owner);
    let path = keystore.key_dir().join(&file_name);

    let lock = keystore.file_lock(&file_name);
    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(stored) = read_key_file(owner, &path)? {
        return Ok((stored, false));
    }

    keypair.generate_with_bits(keystore.config().key_bits)?;

    if persist_new_key(keystore.key_dir(), &path, keypair.private_pem()?)? {
        info!(owner, path = %path.display(), "Generated new key");
        return Ok((keypair, true));
    }

    warn!(
        owner,
        path = %path.display(),
        "Key file appeared while generating; using the stored key"
    );
    let stored = read_key_file(owner, &path)?.ok_or_else(|| {
        KeyError::persistence(
            &path,
            std::io::Error::new(ErrorKind::NotFound, "key file vanished after write race"),
        )
    })?;
    Ok((stored, false))
}

fn read_key_file(owner: &str, path: &Path) -> Result<Option<Keypair>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(KeyError::persistence(path, e)),
    };
    let contents = String::from_utf8(bytes).map_err(|e| {
        KeyError::KeyFormatError(format!("{} is not UTF-8 PEM: {}", path.display(), e))
    })?;

    debug!(owner, path = %path.display(), "Loading stored key");
    Keypair::from_private_pem(owner, &contents).map(Some)
}

/// Write `pem` to `path` unless a file is already there.
///
/// The key is written to a temporary file in `dir` and linked into place
/// without overwriting. Returns `false` if another writer created `path` first.
fn persist_new_key(dir: &Path, path: &Path, pem: &str) -> Result<bool> {
    fs::create_dir_all(dir).map_err(|e| KeyError::persistence(dir, e))?;

    let mut file = tempfile::Builder::new()
        .prefix(".key_")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| KeyError::persistence(dir, e))?;

    file.write_all(pem.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| KeyError::persistence(file.path(), e))?;

    match file.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(KeyError::persistence(path, e.error)),
    }
}
