//! Keyring directory layout.
//!
//! A keyring is a directory holding:
//! - `pubring.txt`: one age public key per line, with an optional
//!   `# label` suffix
//! - `secring/<public key>.age`: the matching secret key, sealed with its
//!   owner's passphrase

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::constants::{PUBRING_FILE, SECRET_EXTENSION, SECRING_DIR};
use crate::core::domain::KeyEntry;
use crate::error::{Result, StorageError};

/// A keyring directory on local disk.
#[derive(Debug, Clone)]
pub struct Keyring {
    dir: PathBuf,
}

impl Keyring {
    /// Open the keyring at `dir`. Missing files read as an empty keyring.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Keyring directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the public keyring file.
    pub fn pubring_path(&self) -> PathBuf {
        self.dir.join(PUBRING_FILE)
    }

    /// Directory holding sealed secret keys.
    pub fn secring_dir(&self) -> PathBuf {
        self.dir.join(SECRING_DIR)
    }

    fn sealed_path(&self, public_key: &str) -> PathBuf {
        self.secring_dir()
            .join(format!("{}{}", public_key, SECRET_EXTENSION))
    }

    /// All well-formed public keyring entries, in file order.
    ///
    /// Lines whose key is not a valid age public key are skipped with a warning.
    pub fn entries(&self) -> Result<Vec<KeyEntry>> {
        let path = self.pubring_path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&path, e)),
        };

        let entries = contents
            .lines()
            .filter_map(KeyEntry::parse_line)
            .filter(|entry| {
                let valid = super::parse_recipient(entry.public_key()).is_ok();
                if !valid {
                    warn!(
                        keyring = %path.display(),
                        key = %entry.public_key(),
                        "skipping malformed public key"
                    );
                }
                valid
            })
            .collect();

        Ok(entries)
    }

    /// Sealed secret key for `public_key`, if present locally.
    pub fn sealed_key(&self, public_key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.sealed_path(public_key);
        match fs::read(&path) {
            Ok(sealed) => Ok(Some(sealed)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Whether a sealed secret key exists for `public_key`.
    pub fn has_sealed_key(&self, public_key: &str) -> bool {
        self.sealed_path(public_key).is_file()
    }

    /// Append a public key to the public keyring.
    pub fn add_public(&self, entry: &KeyEntry) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let path = self.pubring_path();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| io_error(&path, e))?;
        writeln!(file, "{}", entry.to_line()).map_err(|e| io_error(&path, e))?;

        debug!(key = %entry.public_key(), "added public key");
        Ok(())
    }

    /// Store a sealed secret key and its public key.
    pub fn add(&self, entry: &KeyEntry, sealed: &[u8]) -> Result<()> {
        let dir = self.secring_dir();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        let path = self.sealed_path(entry.public_key());
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        // Restrict permissions on sealed key files (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&path).map_err(|e| io_error(&path, e))?;
        file.write_all(sealed).map_err(|e| io_error(&path, e))?;

        self.add_public(entry)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> crate::error::Error {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn public_key() -> String {
        ::age::x25519::Identity::generate().to_public().to_string()
    }

    #[test]
    fn test_missing_keyring_is_empty() {
        let tmp = TempDir::new().unwrap();
        let keyring = Keyring::new(tmp.path().join("absent"));
        assert!(keyring.entries().unwrap().is_empty());
        assert!(keyring.sealed_key("age1none").unwrap().is_none());
    }

    #[test]
    fn test_add_public_appends_in_order() {
        let tmp = TempDir::new().unwrap();
        let keyring = Keyring::new(tmp.path());
        let first = KeyEntry::new(public_key(), Some("first".into()));
        let second = KeyEntry::new(public_key(), None);

        keyring.add_public(&first).unwrap();
        keyring.add_public(&second).unwrap();

        assert_eq!(keyring.entries().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let tmp = TempDir::new().unwrap();
        let keyring = Keyring::new(tmp.path());
        let good = public_key();
        fs::write(
            keyring.pubring_path(),
            format!("# comment\nnot-a-key # broken\n{} # ok\n", good),
        )
        .unwrap();

        let entries = keyring.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].public_key(), good);
    }

    #[test]
    fn test_add_sealed_key() {
        let tmp = TempDir::new().unwrap();
        let keyring = Keyring::new(tmp.path());
        let entry = KeyEntry::new(public_key(), None);

        keyring.add(&entry, b"sealed bytes").unwrap();

        assert!(keyring.has_sealed_key(entry.public_key()));
        assert_eq!(
            keyring.sealed_key(entry.public_key()).unwrap().unwrap(),
            b"sealed bytes"
        );
        assert_eq!(keyring.entries().unwrap(), vec![entry]);
    }
}
