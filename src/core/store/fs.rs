//! Filesystem-based tree storage.
//!
//! Stores every path under a root directory on local disk.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use super::{Entry, Store};
use crate::error::{Result, StorageError};

/// Local disk storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct Filesystem {
    root: PathBuf,
}

impl Filesystem {
    /// Create a store rooted at `root`. The directory need not exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path onto disk.
    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|c| !c.is_empty())
            .fold(self.root.clone(), |acc, c| acc.join(c))
    }

    /// Convert a disk path below the root back into a store path.
    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl Store for Filesystem {
    fn open(&self, path: &str) -> Result<Box<dyn Read>> {
        trace!(path, "opening file");
        let file = fs::File::open(self.resolve(path)).map_err(|e| StorageError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &str) -> Result<Box<dyn Write>> {
        trace!(path, "creating file");
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::from_io(path, e))?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);

        // Restrict permissions on new secret files (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options
            .open(&full)
            .map_err(|e| StorageError::from_io(path, e))?;
        Ok(Box::new(file))
    }

    fn create_dir_all(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.resolve(path)).map_err(|e| StorageError::from_io(path, e).into())
    }

    fn remove(&self, path: &str) -> Result<()> {
        trace!(path, "removing file");
        fs::remove_file(self.resolve(path)).map_err(|e| StorageError::from_io(path, e).into())
    }

    fn list(&self, dir: &str) -> Result<Vec<Entry>> {
        let read = fs::read_dir(self.resolve(dir)).map_err(|e| StorageError::from_io(dir, e))?;

        let mut entries = Vec::new();
        for item in read {
            let item = item.map_err(|e| StorageError::from_io(dir, e))?;
            let file_type = item
                .file_type()
                .map_err(|e| StorageError::from_io(dir, e))?;
            let name = item.file_name().to_string_lossy().into_owned();
            entries.push(Entry::new(super::join(dir, &name), file_type.is_dir()));
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }

    fn walk(&self) -> Box<dyn Iterator<Item = Result<Entry>> + '_> {
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .map(move |item| match item {
                Ok(entry) => Ok(Entry::new(
                    self.relative(entry.path()),
                    entry.file_type().is_dir(),
                )),
                Err(e) => {
                    let path = e
                        .path()
                        .map(|p| self.relative(p))
                        .unwrap_or_default();
                    Err(StorageError::Traversal {
                        path,
                        source: e.into(),
                    }
                    .into())
                }
            });

        Box::new(walker)
    }
}
