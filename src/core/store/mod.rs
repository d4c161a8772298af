//! Tree storage backends.
//!
//! Abstracts the hierarchical medium secrets are persisted in, so the
//! repository never touches a concrete filesystem.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `Store` trait
//! 2. Add the implementation in a new file (e.g., `s3.rs`, `sftp.rs`)
//! 3. Re-export from this module
//!
//! ## Example
//!
//! ```ignore
//! struct Remote { /* ... */ }
//!
//! impl Store for Remote {
//!     fn open(&self, path: &str) -> Result<Box<dyn Read>> {
//!         // Fetch the object body
//!     }
//!     // ...
//! }
//! ```
//!
//! Paths handed to a store are `/`-separated and relative to its root.
//! The empty path denotes the root itself.

use std::io::{Read, Write};

use crate::core::types::StorePath;
use crate::error::Result;

mod fs;
mod memory;

pub use fs::Filesystem;
pub use memory::Memory;

/// A file or directory inside a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the store root.
    pub path: StorePath,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl Entry {
    /// Create an entry.
    pub fn new(path: impl Into<StorePath>, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            is_dir,
        }
    }

    /// Final path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Hierarchical storage trait.
///
/// Every method takes a path relative to the store root.
pub trait Store {
    /// Open a file for reading.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file does not exist.
    fn open(&self, path: &str) -> Result<Box<dyn Read>>;

    /// Create or truncate a file for writing.
    ///
    /// Missing parent directories are created.
    fn create(&self, path: &str) -> Result<Box<dyn Write>>;

    /// Create a directory and all of its parents. Succeeds if it already exists.
    fn create_dir_all(&self, path: &str) -> Result<()>;

    /// Remove a file.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the file does not exist.
    fn remove(&self, path: &str) -> Result<()>;

    /// List the entries directly under a directory, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the directory does not exist.
    fn list(&self, dir: &str) -> Result<Vec<Entry>>;

    /// Traverse the whole tree depth-first, siblings sorted by name.
    ///
    /// The root itself is not yielded. Consumers stop at the first `Err`;
    /// a failure is reported as `StorageError::Traversal`.
    fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry>> + '_>;
}

/// Join a directory and a name into a store path.
pub fn join(dir: &str, name: &str) -> StorePath {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Parent directory of a store path, if it has one.
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(dir, _)| dir)
}
