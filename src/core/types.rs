//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A secret name (e.g., `web/github`, `db/prod/password`).
///
/// Slash-delimited path relative to the store root, without extension.
pub type SecretKey = String;

/// A recipient identity as written in the recipient set file.
///
/// Either an age public key, a keyring label, or an e-mail address.
pub type RecipientId = String;

/// An age public key string (starts with "age1...").
pub type PublicKey = String;

/// A `/`-separated path relative to the store root.
pub type StorePath = String;
