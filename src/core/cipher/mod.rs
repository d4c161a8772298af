//! Cryptographic operations.
//!
//! Provides the encryption provider abstraction consumed by the repository,
//! and the default age implementation.
//!
//! ## Backends
//!
//! - **age**: Default, always available. Uses x25519 public-key encryption
//!   with passphrase-sealed secret keys kept in a keyring directory.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Cipher` trait
//! 2. Add the implementation in a new file (e.g., `gpg.rs`, `kms.rs`)
//! 3. Feature-gate if appropriate
//! 4. Re-export from this module

use std::io::{Read, Write};

use crate::error::Result;

mod age;
mod keyring;

pub use self::age::{parse_recipient, Age, SealedKey};
pub use self::keyring::Keyring;

/// Which keyring a lookup runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ring {
    /// Public keys: who secrets can be encrypted for.
    Public,
    /// Secure (private) keys available locally: what can decrypt.
    Secure,
}

/// A writer that must be finished to produce a complete payload.
///
/// Dropping it without calling [`Seal::finish`] leaves a truncated payload
/// that fails to decrypt.
pub trait Seal: Write {
    /// Flush remaining plaintext, write the payload trailer and flush the sink.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Encryption provider trait.
///
/// Abstracts keyring lookups and stream encryption so the repository can
/// work with any public-key scheme.
///
/// Entities are backend-specific:
/// - age: x25519 recipients and passphrase-sealed x25519 identities
/// - GPG: keyring entities from pubring/secring
pub trait Cipher {
    /// Public-key entity a payload can be encrypted for.
    type Recipient;

    /// Secure-key entity that can decrypt a payload once unlocked.
    type SecureKey;

    /// Human-readable description of a keyring, used in error messages.
    fn keyring_name(&self, ring: Ring) -> String;

    /// Whether `id` matches at least one entity in `ring`.
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring cannot be read.
    fn matches(&self, id: &str, ring: Ring) -> Result<bool>;

    /// Resolve the public-key entities matching any of `ids`.
    ///
    /// Ids with no match contribute nothing; the result may be empty.
    fn public_keys(&self, ids: &[String]) -> Result<Vec<Self::Recipient>>;

    /// Resolve the locally available secure keys matching any of `ids`.
    ///
    /// Ids with no match contribute nothing; the result may be empty.
    fn secure_keys(&self, ids: &[String]) -> Result<Vec<Self::SecureKey>>;

    /// Wrap `sink` so plaintext written to it is encrypted for `recipients`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::NoRecipients` if `recipients` is empty.
    fn encrypt(&self, sink: Box<dyn Write>, recipients: &[Self::Recipient])
        -> Result<Box<dyn Seal>>;

    /// Decrypt `ciphertext` with whichever of `keys` the passphrase unlocks.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::BadPassphrase` if no key unlocks, or
    /// `CipherError::DecryptionFailed` if the payload is not for any
    /// unlocked key or is corrupt.
    fn decrypt(
        &self,
        ciphertext: Box<dyn Read>,
        keys: &[Self::SecureKey],
        passphrase: &[u8],
    ) -> Result<Box<dyn Read>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}
