//! Backup file format constants.
//!
//! This module defines the constants that make up the portable backup
//! format: envelope version, ciphertext payload layout sizes, the key
//! derivation parameters, and the naming scheme for generated files.
//! All of them are format-level contracts shared with the iOS and
//! Android producers and MUST NOT vary per call.

/// Envelope format version written into every backup file.
pub const FORMAT_VERSION: &str = "1.0";

/// Size of the random PBKDF2 salt in bytes.
pub const SALT_SIZE: usize = 32;

/// Size of the AES-CBC initialization vector in bytes.
pub const IV_SIZE: usize = 16;

/// Size of the derived AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count.
///
/// Part of the format: the same (password, salt) pair must always derive
/// the same key so previously produced backups keep decrypting.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Minimum length of the ciphertext payload (`salt ‖ iv ‖ ciphertext`).
///
/// Anything shorter is rejected as malformed before any cryptographic
/// operation is attempted.
pub const MIN_PAYLOAD_SIZE: usize = SALT_SIZE + IV_SIZE;

/// Minimum accepted backup password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Prefix for generated backup file names.
pub const BACKUP_PREFIX: &str = "SecureVault_Backup_";

/// Extension for backup files (includes the leading dot).
pub const BACKUP_EXTENSION: &str = ".backup";

/// `chrono` format string for the filename timestamp (second resolution).
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `chrono` format string for the envelope timestamp (ISO-8601 UTC,
/// millisecond resolution, matching the mobile producers).
pub const ENVELOPE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Application identifier written into the envelope. Diagnostic only.
pub const APP_NAME: &str = "SecureVault";

/// Platform identifier written into the envelope. Diagnostic only.
pub const PLATFORM: &str = "Rust";

/// Default number of backups kept by the retention sweep.
pub const DEFAULT_KEEP_COUNT: usize = 10;
