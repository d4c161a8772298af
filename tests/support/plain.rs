//! In-process test doubles: a transparent cipher and a fault-injecting store.

use std::io::{self, BufRead, BufReader, Read, Write};

use cellar::core::store::Entry;
use cellar::error::{CipherError, Result, StorageError};
use cellar::{Cipher, Memory, Ring, Seal, Store};

/// Header line prefixing every `Plain` payload.
pub const PLAIN_MAGIC: &str = "plain:";

/// A key known to a [`Plain`] keyring.
#[derive(Debug, Clone)]
pub struct PlainKey {
    /// Id the key matches
    pub id: String,
    /// Passphrase unlocking the secure half, if held locally
    pub passphrase: Option<Vec<u8>>,
}

/// A cipher that stores plaintext behind a recipient header.
///
/// Payloads are `plain:<id>,<id>\n` followed by the plaintext, so tests can
/// assert on who a secret was written for without any cryptography.
#[derive(Debug, Clone, Default)]
pub struct Plain {
    keys: Vec<PlainKey>,
}

impl Plain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a public key with a locally held secure key.
    pub fn with_key(mut self, id: &str, passphrase: &[u8]) -> Self {
        self.keys.push(PlainKey {
            id: id.to_string(),
            passphrase: Some(passphrase.to_vec()),
        });
        self
    }

    /// Add a public key only.
    pub fn with_public(mut self, id: &str) -> Self {
        self.keys.push(PlainKey {
            id: id.to_string(),
            passphrase: None,
        });
        self
    }

    fn matching<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a PlainKey> + 'a {
        self.keys.iter().filter(move |k| ids.contains(&k.id))
    }
}

struct PlainWriter {
    sink: Box<dyn Write>,
}

impl Write for PlainWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl Seal for PlainWriter {
    fn finish(mut self: Box<Self>) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

impl Cipher for Plain {
    type Recipient = String;
    type SecureKey = PlainKey;

    fn keyring_name(&self, ring: Ring) -> String {
        match ring {
            Ring::Public => "plain:public".to_string(),
            Ring::Secure => "plain:secure".to_string(),
        }
    }

    fn matches(&self, id: &str, ring: Ring) -> Result<bool> {
        Ok(self.keys.iter().any(|k| {
            k.id == id
                && match ring {
                    Ring::Public => true,
                    Ring::Secure => k.passphrase.is_some(),
                }
        }))
    }

    fn public_keys(&self, ids: &[String]) -> Result<Vec<String>> {
        Ok(self.matching(ids).map(|k| k.id.clone()).collect())
    }

    fn secure_keys(&self, ids: &[String]) -> Result<Vec<PlainKey>> {
        Ok(self
            .matching(ids)
            .filter(|k| k.passphrase.is_some())
            .cloned()
            .collect())
    }

    fn encrypt(&self, mut sink: Box<dyn Write>, recipients: &[String]) -> Result<Box<dyn Seal>> {
        if recipients.is_empty() {
            return Err(CipherError::NoRecipients.into());
        }
        writeln!(sink, "{}{}", PLAIN_MAGIC, recipients.join(","))?;
        Ok(Box::new(PlainWriter { sink }))
    }

    fn decrypt(
        &self,
        ciphertext: Box<dyn Read>,
        keys: &[PlainKey],
        passphrase: &[u8],
    ) -> Result<Box<dyn Read>> {
        let unlocked: Vec<&str> = keys
            .iter()
            .filter(|k| k.passphrase.as_deref() == Some(passphrase))
            .map(|k| k.id.as_str())
            .collect();
        if unlocked.is_empty() {
            return Err(CipherError::BadPassphrase.into());
        }

        let mut reader = BufReader::new(ciphertext);
        let mut header = String::new();
        reader.read_line(&mut header)?;
        let recipients = header
            .trim_end()
            .strip_prefix(PLAIN_MAGIC)
            .ok_or_else(|| CipherError::DecryptionFailed("missing header".to_string()))?;

        if !recipients.split(',').any(|r| unlocked.contains(&r)) {
            return Err(CipherError::DecryptionFailed("not a recipient".to_string()).into());
        }
        Ok(Box::new(reader))
    }

    fn name(&self) -> &'static str {
        "plain"
    }
}

/// A [`Memory`] store whose traversal fails on reaching a given path.
#[derive(Debug, Clone)]
pub struct FailingStore {
    /// Shared backing tree
    pub inner: Memory,
    /// Path at which `walk` reports an error
    pub fail_at: String,
}

impl FailingStore {
    pub fn new(inner: Memory, fail_at: &str) -> Self {
        Self {
            inner,
            fail_at: fail_at.to_string(),
        }
    }
}

impl Store for FailingStore {
    fn open(&self, path: &str) -> Result<Box<dyn Read>> {
        self.inner.open(path)
    }

    fn create(&self, path: &str) -> Result<Box<dyn Write>> {
        self.inner.create(path)
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        self.inner.create_dir_all(path)
    }

    fn remove(&self, path: &str) -> Result<()> {
        self.inner.remove(path)
    }

    fn list(&self, dir: &str) -> Result<Vec<Entry>> {
        self.inner.list(dir)
    }

    fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry>> + '_> {
        let fail_at = self.fail_at.clone();
        Box::new(self.inner.walk().map(move |entry| {
            let entry = entry?;
            if entry.path == fail_at {
                return Err(StorageError::Traversal {
                    path: entry.path,
                    source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
                }
                .into());
            }
            Ok(entry)
        }))
    }
}
