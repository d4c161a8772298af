//! Secret operations.
//!
//! Read, write and remove individual encrypted secrets.

use std::io::{self, BufRead, BufReader, Read, Write};

use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

use super::{secret_path, Repository};
use crate::core::cipher::{Cipher, Seal};
use crate::core::store::{self, Store};
use crate::core::validation::validate_name;
use crate::error::{CipherError, Error, Result, StorageError};

/// A decrypted secret stream.
///
/// Dropping it releases the underlying ciphertext handle.
pub struct Plaintext {
    inner: Box<dyn Read>,
}

impl std::fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plaintext").finish_non_exhaustive()
    }
}

impl Read for Plaintext {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// An encrypting writer for one secret.
///
/// Call [`SecretWriter::finish`] once all plaintext is written. A writer
/// dropped without finishing leaves a truncated file that fails to decrypt.
pub struct SecretWriter {
    key: String,
    inner: Box<dyn Seal>,
}

impl std::fmt::Debug for SecretWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretWriter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SecretWriter {
    /// Name of the secret being written.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Complete the payload so every current recipient can decrypt it.
    pub fn finish(self) -> Result<()> {
        self.inner.finish()?;
        debug!(key = %self.key, "secret written");
        Ok(())
    }
}

impl Write for SecretWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: Store, C: Cipher> Repository<S, C> {
    /// Open a secret for reading.
    ///
    /// # Arguments
    ///
    /// * `key` - Secret name
    /// * `passphrase` - Unlocks the caller's secure key
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotInitialized`, `StorageError::NotFound` if
    /// the secret does not exist, or the cipher's decryption error unchanged.
    pub fn open(&self, key: &str, passphrase: &[u8]) -> Result<Plaintext> {
        validate_name(key)?;
        self.decrypt(key, passphrase)
    }

    pub(super) fn decrypt(&self, key: &str, passphrase: &[u8]) -> Result<Plaintext> {
        let ids = self.ids()?;
        let keys = self.cipher.secure_keys(&ids)?;
        debug!(key = %key, secure_keys = keys.len(), "opening secret");

        let ciphertext = self.store.open(&secret_path(key))?;
        let inner = self.cipher.decrypt(ciphertext, &keys, passphrase)?;

        Ok(Plaintext { inner })
    }

    /// Read the first line of a secret, without its line terminator.
    ///
    /// # Returns
    ///
    /// The line wrapped in `Zeroizing` for secure memory cleanup.
    ///
    /// # Errors
    ///
    /// Same as [`Repository::open`], plus any error while reading the
    /// decrypted stream.
    pub fn line(&self, key: &str, passphrase: &[u8]) -> Result<Zeroizing<String>> {
        validate_name(key)?;
        self.first_line(key, passphrase)
    }

    pub(super) fn first_line(&self, key: &str, passphrase: &[u8]) -> Result<Zeroizing<String>> {
        let plaintext = self.decrypt(key, passphrase)?;
        let mut reader = BufReader::new(plaintext);

        let mut bytes = Zeroizing::new(Vec::new());
        reader
            .read_until(b'\n', &mut bytes)
            .map_err(|e| read_error(key, e))?;
        drop(reader);

        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }

        match String::from_utf8(std::mem::take(&mut *bytes)) {
            Ok(line) => Ok(Zeroizing::new(line)),
            Err(e) => {
                e.into_bytes().zeroize();
                Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("first line of {} is not valid UTF-8", key),
                )
                .into())
            }
        }
    }

    /// Create or overwrite a secret.
    ///
    /// Plaintext written to the returned writer is encrypted for every
    /// current recipient. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for a bad name, `RepositoryError::NotInitialized`,
    /// `CipherError::NoRecipients` if no recipient has a public key, or a
    /// storage error.
    pub fn create(&self, key: &str) -> Result<SecretWriter> {
        validate_name(key)?;

        let ids = self.ids()?;
        let recipients = self.cipher.public_keys(&ids)?;
        if recipients.is_empty() {
            return Err(CipherError::NoRecipients.into());
        }
        debug!(key = %key, recipients = recipients.len(), "creating secret");

        if let Some(dir) = store::parent(key) {
            self.store.create_dir_all(dir)?;
        }
        let sink = self.store.create(&secret_path(key))?;
        let inner = self.cipher.encrypt(sink, &recipients)?;

        Ok(SecretWriter {
            key: key.to_string(),
            inner,
        })
    }

    /// Create or overwrite a secret with `plaintext` in one call.
    pub fn insert(&self, key: &str, plaintext: &[u8]) -> Result<()> {
        let mut writer = self.create(key)?;
        writer
            .write_all(plaintext)
            .map_err(|e| StorageError::from_io(&secret_path(key), e))?;
        writer.finish()
    }

    /// Remove a secret. Parent directories are left in place.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the secret does not exist.
    pub fn remove(&self, key: &str) -> Result<()> {
        validate_name(key)?;
        self.store.remove(&secret_path(key))?;
        debug!(key = %key, "secret removed");
        Ok(())
    }
}

/// Classify a failure reading decrypted plaintext.
///
/// Stream ciphers report a failed chunk authentication as `InvalidData`.
fn read_error(key: &str, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::InvalidData {
        CipherError::DecryptionFailed(format!("{}: {}", key, e)).into()
    } else {
        e.into()
    }
}
