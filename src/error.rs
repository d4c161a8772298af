//! Error types for cellar operations.
//!
//! Errors are layered: each concern has its own enum, and [`Error`] wraps
//! them transparently so callers can match on the domain they care about.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error for all cellar operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Recipient(#[from] RecipientError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the error means a secret, directory or keyring entry is absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Storage(StorageError::NotFound(_)) => true,
            Error::Repository(RepositoryError::Entry { source, .. }) => source.is_not_found(),
            _ => false,
        }
    }

    /// True when a payload could not be decrypted with the supplied key material.
    pub fn is_decryption_failure(&self) -> bool {
        match self {
            Error::Cipher(CipherError::DecryptionFailed(_) | CipherError::BadPassphrase) => true,
            Error::Repository(RepositoryError::Entry { source, .. }) => {
                source.is_decryption_failure()
            }
            _ => false,
        }
    }
}

/// Repository lifecycle errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("not initialized: recipient file {0} is missing")]
    NotInitialized(String),

    #[error("failed to read {key}: {source}")]
    Entry {
        key: String,
        #[source]
        source: Box<Error>,
    },
}

/// Recipient set authorization errors.
#[derive(Error, Debug)]
pub enum RecipientError {
    #[error("no matching public key {id} in {keyring}")]
    UnauthorizedRecipient { id: String, keyring: String },

    #[error("no matching secure keys in {keyring}")]
    NoSecureKey { keyring: String },
}

/// Encryption provider errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("decryption failed: passphrase does not unlock any matching secure key")]
    BadPassphrase,

    #[error("no recipients to encrypt for")]
    NoRecipients,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid secure key {key}: {reason}")]
    InvalidIdentity { key: String, reason: String },

    #[error("armor encoding failed: {0}")]
    ArmorFailed(String),
}

/// Tree storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("traversal failed at {path}: {source}")]
    Traversal {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Classify an I/O error for `path`, mapping `NotFound` to its own variant.
    pub fn from_io(path: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_string())
        } else {
            StorageError::Io {
                path: path.to_string(),
                source,
            }
        }
    }
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("secret name cannot be empty")]
    EmptyName,

    #[error("invalid secret name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("invalid recipient id '{0}': must be a single non-empty line")]
    InvalidRecipient(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine home directory")]
    NoHomeDir,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for cellar operations.
pub type Result<T> = std::result::Result<T, Error>;
