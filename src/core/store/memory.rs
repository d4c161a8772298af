//! In-memory tree storage.
//!
//! Keeps the whole tree in a shared map. Clones share the same tree, so a
//! test can hand one handle to a repository and inspect another.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{join, parent, Entry, Store};
use crate::error::{Result, StorageError};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    File(Vec<u8>),
}

type Tree = BTreeMap<String, Node>;

/// In-process storage backend.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    tree: Arc<Mutex<Tree>>,
}

impl Memory {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_dirs(tree: &mut Tree, path: &str) -> Result<()> {
        let mut prefix = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            prefix = join(&prefix, component);
            match tree.get(&prefix) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => {
                    return Err(StorageError::Io {
                        path: prefix,
                        source: io::Error::new(io::ErrorKind::Other, "not a directory"),
                    }
                    .into())
                }
                None => {
                    tree.insert(prefix.clone(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn is_dir(tree: &Tree, path: &str) -> bool {
        path.is_empty() || matches!(tree.get(path), Some(Node::Dir))
    }

    fn children(tree: &Tree, dir: &str) -> Vec<Entry> {
        tree.iter()
            .filter(|(path, _)| parent(path).unwrap_or("") == dir)
            .map(|(path, node)| Entry::new(path.clone(), matches!(node, Node::Dir)))
            .collect()
    }

    fn collect(tree: &Tree, dir: &str, out: &mut Vec<Entry>) {
        for entry in Self::children(tree, dir) {
            let descend = entry.is_dir;
            let path = entry.path.clone();
            out.push(entry);
            if descend {
                Self::collect(tree, &path, out);
            }
        }
    }
}

/// Writer appending straight into the shared tree.
struct MemoryWriter {
    tree: Arc<Mutex<Tree>>,
    path: String,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut tree = self.tree.lock().unwrap_or_else(|e| e.into_inner());
        match tree.get_mut(&self.path) {
            Some(Node::File(data)) => {
                data.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} was removed while open", self.path),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Store for Memory {
    fn open(&self, path: &str) -> Result<Box<dyn Read>> {
        match self.lock().get(path) {
            Some(Node::File(data)) => Ok(Box::new(Cursor::new(data.clone()))),
            _ => Err(StorageError::NotFound(path.to_string()).into()),
        }
    }

    fn create(&self, path: &str) -> Result<Box<dyn Write>> {
        let mut tree = self.lock();
        if let Some(dir) = parent(path) {
            Self::ensure_dirs(&mut tree, dir)?;
        }
        if let Some(Node::Dir) = tree.get(path) {
            return Err(StorageError::Io {
                path: path.to_string(),
                source: io::Error::new(io::ErrorKind::Other, "is a directory"),
            }
            .into());
        }
        tree.insert(path.to_string(), Node::File(Vec::new()));

        Ok(Box::new(MemoryWriter {
            tree: Arc::clone(&self.tree),
            path: path.to_string(),
        }))
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        Self::ensure_dirs(&mut self.lock(), path)
    }

    fn remove(&self, path: &str) -> Result<()> {
        let mut tree = self.lock();
        match tree.get(path) {
            Some(Node::File(_)) => {
                tree.remove(path);
                Ok(())
            }
            _ => Err(StorageError::NotFound(path.to_string()).into()),
        }
    }

    fn list(&self, dir: &str) -> Result<Vec<Entry>> {
        let tree = self.lock();
        if !Self::is_dir(&tree, dir) {
            return Err(StorageError::NotFound(dir.to_string()).into());
        }
        Ok(Self::children(&tree, dir))
    }

    fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry>> + '_> {
        let tree = self.lock();
        let mut entries = Vec::new();
        Self::collect(&tree, "", &mut entries);
        Box::new(entries.into_iter().map(Ok))
    }
}
