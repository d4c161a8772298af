//! Test support utilities for cellar integration tests.
//!
//! Provides isolated repositories over temp directories and in-memory
//! backends for fault injection.

#![allow(dead_code)]

pub mod fixtures;
pub mod plain;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use plain::*;

use std::io::{Read, Write};
use std::path::PathBuf;

use cellar::core::domain::KeyEntry;
use cellar::{Age, Filesystem, Repository};
use tempfile::TempDir;

/// Test environment with an isolated store and keyring.
///
/// Each test gets its own temporary store dir and keyring dir. No
/// process-global state is mutated, so tests can run in parallel.
pub struct Test {
    /// Temporary store root
    pub store: TempDir,
    /// Temporary keyring directory
    pub keys: TempDir,
    /// Repository over both
    pub repo: Repository<Filesystem, Age>,
    /// Alice's public keyring entry (secure key sealed with `ALICE_PASS`)
    pub alice: KeyEntry,
}

impl Test {
    /// Create an environment with Alice's keypair but no initialized repository.
    pub fn new() -> Self {
        init_tracing();

        let store = TempDir::new().expect("failed to create temp store");
        let keys = TempDir::new().expect("failed to create temp keyring");

        let cipher = Age::new(keys.path()).with_work_factor(WORK_FACTOR);
        let alice = cipher
            .generate(Some(ALICE_LABEL), ALICE_PASS)
            .expect("failed to generate alice's key");
        let repo = Repository::new(Filesystem::new(store.path()), cipher);

        Self {
            store,
            keys,
            repo,
            alice,
        }
    }

    /// Create an environment with the repository initialized for Alice.
    pub fn init() -> Self {
        let t = Self::new();
        t.repo
            .init(&[ALICE_EMAIL])
            .expect("failed to initialize repository");
        t
    }

    /// Create an initialized environment with secrets written.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let t = Self::init();
        for (key, value) in secrets {
            t.write(key, value);
        }
        t
    }

    /// Write a secret through the repository.
    pub fn write(&self, key: &str, value: &str) {
        let mut writer = self.repo.create(key).expect("create failed");
        writer.write_all(value.as_bytes()).expect("write failed");
        writer.finish().expect("finish failed");
    }

    /// Read a whole secret as Alice.
    pub fn read(&self, key: &str) -> String {
        let mut out = String::new();
        self.repo
            .open(key, ALICE_PASS)
            .expect("open failed")
            .read_to_string(&mut out)
            .expect("read failed");
        out
    }

    /// On-disk path of a store-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .fold(self.store.path().to_path_buf(), |acc, c| acc.join(c))
    }

    /// Write raw bytes into the store, bypassing encryption.
    pub fn write_raw(&self, rel: &str, bytes: &[u8]) {
        let path = self.path(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, bytes).unwrap();
    }

    /// A second user with their own keyring, sharing this store.
    ///
    /// Bob's public key is added to Alice's keyring so Alice can encrypt
    /// for him, and Alice's to Bob's.
    pub fn bob(&self) -> (TempDir, Repository<Filesystem, Age>, KeyEntry) {
        let keys = TempDir::new().expect("failed to create bob's keyring");
        let cipher = Age::new(keys.path()).with_work_factor(WORK_FACTOR);
        let bob = cipher
            .generate(Some(BOB_LABEL), BOB_PASS)
            .expect("failed to generate bob's key");

        self.repo.cipher().keyring().add_public(&bob).unwrap();
        cipher.keyring().add_public(&self.alice).unwrap();

        let repo = Repository::new(Filesystem::new(self.store.path()), cipher);
        (keys, repo, bob)
    }
}

/// Install a test subscriber honoring `CELLAR_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("CELLAR_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
