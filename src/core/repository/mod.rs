//! The primary interface for cellar operations.
//!
//! A repository composes a [`Store`] holding the encrypted tree with a
//! [`Cipher`] that knows which keys may read and write it.

mod enumerate;
mod secrets;

pub use enumerate::PartialMap;
pub use secrets::{Plaintext, SecretWriter};

use std::io::{Read, Write};

use tracing::debug;

use crate::core::cipher::{Cipher, Ring};
use crate::core::constants::{RECIPIENTS_FILE, SECRET_EXTENSION};
use crate::core::domain::RecipientSet;
use crate::core::store::Store;
use crate::core::types::RecipientId;
use crate::error::{Error, RecipientError, RepositoryError, Result, StorageError};

/// A hierarchical store of individually encrypted secrets.
///
/// Owns its storage. The recipient set is read from storage on every
/// operation, so changes made by another handle are observed immediately.
pub struct Repository<S, C> {
    store: S,
    cipher: C,
}

impl<S: std::fmt::Debug, C: std::fmt::Debug> std::fmt::Debug for Repository<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("store", &self.store)
            .field("cipher", &self.cipher)
            .finish()
    }
}

impl<S: Store, C: Cipher> Repository<S, C> {
    /// Create a repository over `store`, using `cipher` for key lookups and
    /// encryption. Nothing is read or written until the first operation.
    pub fn new(store: S, cipher: C) -> Self {
        Self { store, cipher }
    }

    /// Underlying storage.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying encryption provider.
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Initialize the repository for `ids`.
    ///
    /// Every id must match a public key, and at least one id must have a
    /// secure key available locally. The recipient file is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `RecipientError::UnauthorizedRecipient` naming the first id
    /// without a public key, `RecipientError::NoSecureKey` if no id has a
    /// local secure key, or a storage error.
    pub fn init<I: AsRef<str>>(&self, ids: &[I]) -> Result<()> {
        let set = RecipientSet::new(ids)?;
        debug!(recipients = set.len(), "initializing repository");

        for id in set.ids() {
            if !self.cipher.matches(id, Ring::Public)? {
                return Err(RecipientError::UnauthorizedRecipient {
                    id: id.clone(),
                    keyring: self.cipher.keyring_name(Ring::Public),
                }
                .into());
            }
        }

        if self.cipher.secure_keys(set.ids())?.is_empty() {
            return Err(RecipientError::NoSecureKey {
                keyring: self.cipher.keyring_name(Ring::Secure),
            }
            .into());
        }

        self.store.create_dir_all("")?;
        let mut file = self.store.create(RECIPIENTS_FILE)?;
        file.write_all(set.serialize().as_bytes())
            .map_err(|e| StorageError::from_io(RECIPIENTS_FILE, e))?;
        file.flush()
            .map_err(|e| StorageError::from_io(RECIPIENTS_FILE, e))?;

        debug!("repository initialized");
        Ok(())
    }

    /// Current recipient ids, in file order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotInitialized` if the recipient file is missing.
    pub fn ids(&self) -> Result<Vec<RecipientId>> {
        Ok(self.recipients()?.into_ids())
    }

    fn recipients(&self) -> Result<RecipientSet> {
        let mut file = self.store.open(RECIPIENTS_FILE).map_err(|e| {
            if e.is_not_found() {
                Error::from(RepositoryError::NotInitialized(RECIPIENTS_FILE.to_string()))
            } else {
                e
            }
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| StorageError::from_io(RECIPIENTS_FILE, e))?;

        Ok(RecipientSet::parse(&contents))
    }
}

/// Storage path of a secret.
fn secret_path(key: &str) -> String {
    format!("{}{}", key, SECRET_EXTENSION)
}

/// Strip the secret extension from a path, if it names a secret.
fn secret_name(path: &str) -> Option<&str> {
    let name = path.strip_suffix(SECRET_EXTENSION)?;
    let base = name.rsplit('/').next().unwrap_or(name);
    if base.is_empty() {
        None
    } else {
        Some(name)
    }
}
