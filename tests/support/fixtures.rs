//! Test fixtures and constants.

/// scrypt work factor for sealed test keys; low so tests stay fast.
pub const WORK_FACTOR: u8 = 2;

/// Alice's keyring label.
pub const ALICE_LABEL: &str = "Alice <alice@example.com>";

/// Alice's e-mail, used as her recipient id.
pub const ALICE_EMAIL: &str = "alice@example.com";

/// Passphrase sealing Alice's secure key.
pub const ALICE_PASS: &[u8] = b"alice passphrase";

/// Bob's keyring label.
pub const BOB_LABEL: &str = "Bob <bob@example.com>";

/// Bob's e-mail, used as his recipient id.
pub const BOB_EMAIL: &str = "bob@example.com";

/// Passphrase sealing Bob's secure key.
pub const BOB_PASS: &[u8] = b"bob passphrase";

/// A valid age public key nobody holds the secret half of.
pub const CAROL_PUBLIC_KEY: &str = "age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p";

/// Secrets used across multiple tests.
pub const STANDARD_SECRETS: &[(&str, &str)] = &[
    ("email/personal", "p@ssw0rd!\nuser: alice\n"),
    ("email/work", "correct-horse\n"),
    ("web/github", "ghp_token\nurl: https://github.com\n"),
    ("bank", "1234"),
];
