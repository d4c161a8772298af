//! Age encryption backend implementation.
//!
//! Encrypts secrets with the age format for x25519 recipients, ASCII
//! armored. Secret keys live in a [`Keyring`] sealed with a passphrase
//! (age scrypt recipient) and are unsealed per decryption.

use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use ::age::armor::{ArmoredReader, ArmoredWriter, Format};
use ::age::secrecy::{ExposeSecret, SecretString};
use ::age::stream::StreamWriter;
use ::age::{scrypt, x25519, DecryptError, Decryptor, Encryptor};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{Cipher, Keyring, Ring, Seal};
use crate::core::constants::DEFAULT_WORK_FACTOR;
use crate::core::domain::KeyEntry;
use crate::error::{CipherError, Result};

/// A secret key available locally, still sealed with its owner's passphrase.
#[derive(Debug, Clone)]
pub struct SealedKey {
    entry: KeyEntry,
    sealed: Vec<u8>,
}

impl SealedKey {
    /// The public keyring entry this key belongs to.
    pub fn entry(&self) -> &KeyEntry {
        &self.entry
    }

    /// Unseal with `passphrase`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::BadPassphrase` if the passphrase is wrong, or
    /// `CipherError::InvalidIdentity` if the sealed file is unusable.
    fn unseal(&self, passphrase: &str) -> Result<x25519::Identity> {
        let invalid = |reason: String| CipherError::InvalidIdentity {
            key: self.entry.public_key().to_string(),
            reason,
        };

        let decryptor = Decryptor::new(ArmoredReader::new(self.sealed.as_slice()))
            .map_err(|e| invalid(e.to_string()))?;

        let identity = scrypt::Identity::new(SecretString::from(passphrase.to_owned()));
        let mut reader = decryptor
            .decrypt(std::iter::once(&identity as &dyn ::age::Identity))
            .map_err(|e| match e {
                DecryptError::ExcessiveWork { .. } => invalid(e.to_string()),
                _ => CipherError::BadPassphrase,
            })?;

        let mut text = Zeroizing::new(String::new());
        reader
            .read_to_string(&mut text)
            .map_err(|e| invalid(e.to_string()))?;

        let unsealed: x25519::Identity = text
            .trim()
            .parse()
            .map_err(|e: &str| invalid(e.to_string()))?;

        if unsealed.to_public().to_string() != self.entry.public_key() {
            return Err(invalid("sealed key does not match its public key".to_string()).into());
        }

        Ok(unsealed)
    }
}

/// Age-based encryption provider backed by a keyring directory.
#[derive(Debug, Clone)]
pub struct Age {
    keyring: Keyring,
    work_factor: u8,
}

impl Age {
    /// Create a provider using the keyring at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            keyring: Keyring::new(dir),
            work_factor: DEFAULT_WORK_FACTOR,
        }
    }

    /// Set the scrypt work factor (log2 N) used when sealing new keys.
    pub fn with_work_factor(mut self, log_n: u8) -> Self {
        self.work_factor = log_n;
        self
    }

    /// The underlying keyring.
    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    /// Generate a keypair, seal the secret key with `passphrase` and add
    /// both halves to the keyring.
    ///
    /// # Returns
    ///
    /// The new public keyring entry.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if the passphrase is not UTF-8 or sealing fails.
    pub fn generate(&self, label: Option<&str>, passphrase: &[u8]) -> Result<KeyEntry> {
        let passphrase = std::str::from_utf8(passphrase).map_err(|_| {
            CipherError::EncryptionFailed("passphrase must be valid UTF-8".to_string())
        })?;

        let identity = x25519::Identity::generate();
        let entry = KeyEntry::new(
            identity.to_public().to_string(),
            label.map(str::to_string),
        );
        debug!(key = %entry.public_key(), "generating keypair");

        let sealed = seal(&identity, passphrase, self.work_factor)?;
        self.keyring.add(&entry, &sealed)?;

        Ok(entry)
    }

    fn matching(&self, ids: &[String]) -> Result<Vec<KeyEntry>> {
        let mut matched: Vec<KeyEntry> = Vec::new();
        for entry in self.keyring.entries()? {
            let wanted = ids.iter().any(|id| entry.matches(id));
            let seen = matched
                .iter()
                .any(|m| m.public_key() == entry.public_key());
            if wanted && !seen {
                matched.push(entry);
            }
        }
        Ok(matched)
    }
}

/// Seal an identity with a passphrase using the age scrypt recipient.
fn seal(identity: &x25519::Identity, passphrase: &str, work_factor: u8) -> Result<Vec<u8>> {
    let mut recipient = scrypt::Recipient::new(SecretString::from(passphrase.to_owned()));
    recipient.set_work_factor(work_factor);

    let encryptor =
        Encryptor::with_recipients(std::iter::once(&recipient as &dyn ::age::Recipient))
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    let mut sealed = Vec::new();
    let armored = ArmoredWriter::wrap_output(&mut sealed, Format::AsciiArmor)
        .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;
    let mut writer = encryptor
        .wrap_output(armored)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

    writer.write_all(identity.to_string().expose_secret().as_bytes())?;
    writer
        .finish()
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?
        .finish()
        .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;

    Ok(sealed)
}

/// Streaming age writer over an armored sink.
struct AgeWriter {
    stream: StreamWriter<ArmoredWriter<Box<dyn Write>>>,
}

impl Write for AgeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Seal for AgeWriter {
    fn finish(self: Box<Self>) -> Result<()> {
        let armored = self
            .stream
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        let mut sink = armored
            .finish()
            .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;
        sink.flush()?;

        trace!("sealed payload");
        Ok(())
    }
}

impl Cipher for Age {
    type Recipient = x25519::Recipient;
    type SecureKey = SealedKey;

    fn keyring_name(&self, ring: Ring) -> String {
        match ring {
            Ring::Public => self.keyring.pubring_path().display().to_string(),
            Ring::Secure => self.keyring.secring_dir().display().to_string(),
        }
    }

    fn matches(&self, id: &str, ring: Ring) -> Result<bool> {
        let entries = self.keyring.entries()?;
        let found = entries.iter().filter(|e| e.matches(id)).any(|e| match ring {
            Ring::Public => true,
            Ring::Secure => self.keyring.has_sealed_key(e.public_key()),
        });
        Ok(found)
    }

    fn public_keys(&self, ids: &[String]) -> Result<Vec<x25519::Recipient>> {
        self.matching(ids)?
            .iter()
            .map(|entry| parse_recipient(entry.public_key()))
            .collect()
    }

    fn secure_keys(&self, ids: &[String]) -> Result<Vec<SealedKey>> {
        let mut keys = Vec::new();
        for entry in self.matching(ids)? {
            if let Some(sealed) = self.keyring.sealed_key(entry.public_key())? {
                keys.push(SealedKey { entry, sealed });
            }
        }
        Ok(keys)
    }

    fn encrypt(
        &self,
        sink: Box<dyn Write>,
        recipients: &[x25519::Recipient],
    ) -> Result<Box<dyn Seal>> {
        if recipients.is_empty() {
            return Err(CipherError::NoRecipients.into());
        }
        trace!(recipients = recipients.len(), "encrypting");

        let encryptor =
            Encryptor::with_recipients(recipients.iter().map(|r| r as &dyn ::age::Recipient))
                .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let armored = ArmoredWriter::wrap_output(sink, Format::AsciiArmor)
            .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;
        let stream = encryptor
            .wrap_output(armored)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        Ok(Box::new(AgeWriter { stream }))
    }

    fn decrypt(
        &self,
        ciphertext: Box<dyn Read>,
        keys: &[SealedKey],
        passphrase: &[u8],
    ) -> Result<Box<dyn Read>> {
        if keys.is_empty() {
            return Err(
                CipherError::DecryptionFailed("no matching secure key".to_string()).into(),
            );
        }
        let passphrase = std::str::from_utf8(passphrase).map_err(|_| CipherError::BadPassphrase)?;

        let mut identities = Vec::new();
        for key in keys {
            match key.unseal(passphrase) {
                Ok(identity) => identities.push(identity),
                Err(crate::error::Error::Cipher(CipherError::BadPassphrase)) => {
                    trace!(key = %key.entry().public_key(), "passphrase does not unlock key");
                }
                Err(e) => return Err(e),
            }
        }
        if identities.is_empty() {
            return Err(CipherError::BadPassphrase.into());
        }
        trace!(unlocked = identities.len(), "decrypting");

        let decryptor = Decryptor::new(ArmoredReader::new(BufReader::new(ciphertext)))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;
        let reader = decryptor
            .decrypt(identities.iter().map(|i| i as &dyn ::age::Identity))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        Ok(Box::new(reader))
    }

    fn name(&self) -> &'static str {
        "age"
    }
}

/// Parse a public key string into an age recipient
///
/// # Errors
///
/// Returns `CipherError::InvalidPublicKey` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| CipherError::InvalidPublicKey(key.to_string()).into())
}
