//! Cellar - a hierarchical store of individually encrypted secrets.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── error             # Error types
//! └── core/             # Core library components
//!     ├── repository/   # Init, open, line, map, create, remove, walk
//!     ├── cipher/       # Encryption providers
//!     │   ├── mod       # Cipher trait
//!     │   ├── age       # age implementation
//!     │   └── keyring   # pubring/secring directory layout
//!     ├── store/        # Tree storage backends
//!     │   ├── mod       # Store trait
//!     │   ├── fs        # Local disk
//!     │   └── memory    # In-process tree
//!     ├── domain/       # Recipient set, keyring entries
//!     ├── config        # Store and keyring locations
//!     └── validation    # Secret name rules
//! ```
//!
//! # Layout
//!
//! - `.age-id` at the root lists the recipient ids, one per line
//! - every secret `name` is stored as `name.age`, encrypted for all of them
//!
//! # Example
//!
//! ```no_run
//! use std::io::Read;
//!
//! use cellar::{Age, Filesystem, Repository};
//!
//! # fn main() -> cellar::error::Result<()> {
//! let repo = Repository::new(Filesystem::new("/tmp/store"), Age::new("/tmp/keyring"));
//! repo.init(&["alice@example.com"])?;
//!
//! repo.insert("web/github", b"hunter2\nuser: alice\n")?;
//! assert_eq!(repo.line("web/github", b"passphrase")?.as_str(), "hunter2");
//!
//! let mut all = String::new();
//! repo.open("web/github", b"passphrase")?.read_to_string(&mut all)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;

pub use crate::core::cipher::{Age, Cipher, Ring, Seal};
pub use crate::core::config::Config;
pub use crate::core::repository::{PartialMap, Plaintext, Repository, SecretWriter};
pub use crate::core::store::{Entry, Filesystem, Memory, Store};
pub use crate::error::{Error, Result};
