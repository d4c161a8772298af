//! Recipient set.
//!
//! The ordered list of identities authorized for a repository, persisted
//! one per line in the recipient file.

use crate::core::types::RecipientId;
use crate::error::{Result, ValidationError};

/// Identities allowed to decrypt the secrets of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSet {
    ids: Vec<RecipientId>,
}

impl RecipientSet {
    /// Build a set from ids, rejecting ids that cannot be stored on one line.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidRecipient` for empty ids or ids
    /// containing line breaks or surrounding whitespace.
    pub fn new<S: AsRef<str>>(ids: &[S]) -> Result<Self> {
        let ids = ids
            .iter()
            .map(|id| {
                let id = id.as_ref();
                if id.is_empty() || id.contains(['\n', '\r']) || id.trim() != id {
                    return Err(ValidationError::InvalidRecipient(id.to_string()).into());
                }
                Ok(id.to_string())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { ids })
    }

    /// Parse the recipient file contents. Blank lines are skipped.
    pub fn parse(contents: &str) -> Self {
        let ids = contents
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Self { ids }
    }

    /// Serialize to the recipient file format, one newline-terminated id per line.
    pub fn serialize(&self) -> String {
        self.ids.iter().map(|id| format!("{}\n", id)).collect()
    }

    /// Ids in their original order.
    pub fn ids(&self) -> &[RecipientId] {
        &self.ids
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set has no ids.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Consume the set, returning its ids.
    pub fn into_ids(self) -> Vec<RecipientId> {
        self.ids
    }
}
