//! Enumeration operations.
//!
//! Directory maps and whole-tree traversal.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{secret_name, Repository};
use crate::core::cipher::Cipher;
use crate::core::store::{self, Store};
use crate::core::types::SecretKey;
use crate::core::validation::validate_dir;
use crate::error::{Error, RepositoryError, Result};

/// Result of reading a directory where individual entries may fail.
#[derive(Debug, Default)]
pub struct PartialMap {
    /// First line of every entry that decrypted, keyed by base name.
    pub values: BTreeMap<String, Zeroizing<String>>,
    /// Entries that failed, keyed by base name.
    pub failures: BTreeMap<String, Error>,
}

impl PartialMap {
    /// Whether every entry was read.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<S: Store, C: Cipher> Repository<S, C> {
    /// Secrets directly under `dir`, keyed by base name.
    fn secrets_in(&self, dir: &str) -> Result<(String, Vec<String>)> {
        let dir = validate_dir(dir)?;
        let names = self
            .store
            .list(&dir)?
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .filter_map(|entry| secret_name(entry.name()).map(str::to_string))
            .collect();
        Ok((dir, names))
    }

    /// Read the first line of every secret directly under `dir`.
    ///
    /// Subdirectories and files without the secret extension are ignored.
    ///
    /// # Returns
    ///
    /// Map from base name to first line.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if `dir` does not exist. The first
    /// entry that fails to read is returned as `RepositoryError::Entry`.
    pub fn map(&self, dir: &str, passphrase: &[u8]) -> Result<BTreeMap<String, Zeroizing<String>>> {
        let (dir, names) = self.secrets_in(dir)?;
        debug!(dir = %dir, entries = names.len(), "reading directory");

        let mut values = BTreeMap::new();
        for name in names {
            let key = store::join(&dir, &name);
            let value = self
                .first_line(&key, passphrase)
                .map_err(|e| RepositoryError::Entry {
                    key: key.clone(),
                    source: Box::new(e),
                })?;
            values.insert(name, value);
        }

        Ok(values)
    }

    /// Like [`Repository::map`], but collects per-entry failures instead of
    /// stopping at the first one.
    ///
    /// # Errors
    ///
    /// Only fails if the directory itself cannot be listed.
    pub fn map_partial(&self, dir: &str, passphrase: &[u8]) -> Result<PartialMap> {
        let (dir, names) = self.secrets_in(dir)?;

        let mut result = PartialMap::default();
        for name in names {
            let key = store::join(&dir, &name);
            match self.first_line(&key, passphrase) {
                Ok(value) => {
                    result.values.insert(name, value);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to read secret");
                    result.failures.insert(name, e);
                }
            }
        }

        Ok(result)
    }

    /// Visit the name of every secret in the tree.
    ///
    /// Traversal is depth-first with siblings sorted by name. Files without
    /// the secret extension are skipped.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first traversal error; names already
    /// visited stay visited.
    pub fn walk<F: FnMut(&str)>(&self, mut visit: F) -> Result<()> {
        for entry in self.store.walk() {
            let entry = entry?;
            if entry.is_dir {
                continue;
            }
            if let Some(name) = secret_name(&entry.path) {
                visit(name);
            }
        }
        Ok(())
    }

    /// Names of every secret in the tree, in traversal order.
    pub fn list(&self) -> Result<Vec<SecretKey>> {
        let mut names = Vec::new();
        self.walk(|name| names.push(name.to_string()))?;
        Ok(names)
    }
}
