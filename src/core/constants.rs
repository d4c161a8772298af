//! Constants used throughout cellar.
//!
//! Centralizes reserved file names and configuration values.

/// Recipient set file at the repository root, one identity per line.
pub const RECIPIENTS_FILE: &str = ".age-id";

/// Suffix marking a file as an encrypted secret.
pub const SECRET_EXTENSION: &str = ".age";

/// Public keyring file inside a keyring directory.
pub const PUBRING_FILE: &str = "pubring.txt";

/// Directory of passphrase-sealed secret keys inside a keyring directory.
pub const SECRING_DIR: &str = "secring";

/// Default store directory relative to HOME (~/.cellar).
pub const STORE_DIR: &str = ".cellar";

/// Application directory under the platform config dir.
pub const APP_DIR: &str = "cellar";

/// Keyring directory under the application config dir.
pub const KEYRING_DIR: &str = "keyring";

/// Optional configuration file under the application config dir.
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the store directory.
pub const STORE_DIR_ENV: &str = "CELLAR_DIR";

/// Environment variable overriding the keyring directory.
pub const KEYRING_DIR_ENV: &str = "CELLAR_KEYRING";

/// scrypt work factor (log2 N) used when sealing secret keys.
pub const DEFAULT_WORK_FACTOR: u8 = 18;
