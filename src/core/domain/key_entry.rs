//! Public keyring entry.
//!
//! Binds an age public key to an optional human-readable label.

use crate::core::types::PublicKey;

/// A public key known to the keyring.
///
/// Written to the public keyring as `age1... # Label <mail@example.com>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEntry {
    public_key: PublicKey,
    label: Option<String>,
}

impl KeyEntry {
    /// Create an entry from a public key and an optional label.
    pub fn new(public_key: PublicKey, label: Option<String>) -> Self {
        Self { public_key, label }
    }

    /// Parse one keyring line.
    ///
    /// Returns `None` for blank lines and `#` comment lines.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let (key, label) = match trimmed.split_once('#') {
            Some((k, l)) => {
                let l = l.trim();
                (k.trim(), (!l.is_empty()).then(|| l.to_string()))
            }
            None => (trimmed, None),
        };

        if key.is_empty() {
            return None;
        }

        Some(Self::new(key.to_string(), label))
    }

    /// Format as a keyring line (without the trailing newline).
    pub fn to_line(&self) -> String {
        match &self.label {
            Some(label) => format!("{} # {}", self.public_key, label),
            None => self.public_key.clone(),
        }
    }

    /// The age public key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// The label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// E-mail address inside `<...>` in the label, if any.
    pub fn email(&self) -> Option<&str> {
        let label = self.label.as_deref()?;
        let start = label.find('<')?;
        let end = label[start..].find('>')? + start;
        Some(&label[start + 1..end])
    }

    /// Whether a recipient id refers to this entry.
    ///
    /// An id matches on the exact public key, the exact label, or the
    /// e-mail address in the label.
    pub fn matches(&self, id: &str) -> bool {
        id == self.public_key || self.label() == Some(id) || self.email() == Some(id)
    }
}

impl std::fmt::Display for KeyEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({})", self.public_key, label),
            None => write!(f, "{}", self.public_key),
        }
    }
}
