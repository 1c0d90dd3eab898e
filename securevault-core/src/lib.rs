//! Encrypted credential backup/restore engine.
//!
//! This crate turns an in-memory collection of credential records into a
//! single portable, password-protected backup file and back, using the
//! format shared with the companion iOS and Android applications:
//!
//! - PBKDF2-HMAC-SHA256 key derivation (100 000 iterations, 256-bit key)
//! - AES-256-CBC with PKCS#7 padding over a `salt ‖ iv ‖ ciphertext`
//!   payload
//! - a versioned JSON envelope carrying the base64 payload plus display
//!   metadata
//!
//! # Architecture
//!
//! The engine is platform-agnostic; the credential database and the
//! dual-location file sink are injected through the traits in
//! [`platform`]:
//!
//! ```
//! use securevault_core::platform::memory::{MemoryCredentialStore, MemoryFileStore};
//! use securevault_core::{BackupService, PasswordRecord};
//!
//! let store = MemoryCredentialStore::with_records(vec![PasswordRecord::new(
//!     "Gmail", "user", "hunter2-but-better", "",
//! )]);
//! let files = MemoryFileStore::new();
//! let service = BackupService::new(&store, &files);
//!
//! let report = service.create("correct-horse", None, false).unwrap();
//! assert_eq!(report.password_count, 1);
//! ```
//!
//! Restore reverses the pipeline and classifies failures strictly:
//! structural problems are [`BackupError::InvalidFile`], a decryption
//! rejection is [`BackupError::InvalidPassword`], and policy violations
//! are caught before any cryptographic work.

mod codec;
mod crypto;
mod envelope;
mod error;
mod format;
pub mod platform;
mod resolver;
mod service;
mod types;

pub use codec::{decode, encode};
pub use crypto::{decrypt, derive_key, encrypt, open, seal, BackupKey};
pub use envelope::BackupEnvelope;
pub use error::{BackupError, BackupResult};
pub use format::{
    APP_NAME, BACKUP_EXTENSION, BACKUP_PREFIX, DEFAULT_KEEP_COUNT, FORMAT_VERSION, IV_SIZE,
    KEY_SIZE, MIN_PASSWORD_LEN, MIN_PAYLOAD_SIZE, PBKDF2_ITERATIONS, SALT_SIZE,
};
pub use resolver::{generate_file_name, StorageResolver};
pub use service::BackupService;
pub use types::{
    now_millis, BackupFileInfo, CreateReport, PasswordRecord, RestoreReport,
    StorageLocationReport,
};
