//! Collaborator traits the backup engine depends on.
//!
//! The engine itself is platform-agnostic: the credential database and
//! the byte sink/source for backup files are abstracted behind traits
//! supplied at construction time.
//!
//! - [`CredentialStore`]: the keyed CRUD store holding the vault's
//!   records (a `SQLite`/Room database on the mobile apps)
//! - [`BackupFileStore`]: the dual-location file sink/source (app
//!   private storage plus an optional shared/public directory)
//!
//! In-memory implementations for testing live in [`memory`]; a plain
//! filesystem implementation lives in [`fs`].

mod fs;
pub mod memory;

pub use fs::FsFileStore;

use crate::error::BackupResult;
use crate::types::{BackupFileInfo, PasswordRecord};

/// The external credential store consumed by the backup service.
///
/// All operations are whole-operation successes or failures; no
/// partial-batch reporting is consumed by this engine. `replace_all`
/// must make the clear-then-insert sequence atomic for concurrent
/// readers; that guarantee is owed by the implementation (a database
/// transaction or equivalent), not enforced here.
pub trait CredentialStore {
    /// Returns every record in the store.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Store`](crate::BackupError::Store) when
    /// the store cannot be read.
    fn list_all(&self) -> BackupResult<Vec<PasswordRecord>>;

    /// Inserts records, replacing any existing record with the same id
    /// (the store's own upsert contract).
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Store`](crate::BackupError::Store) when
    /// the apply step is rejected as a whole.
    fn insert_many(&self, records: &[PasswordRecord]) -> BackupResult<()>;

    /// Atomically clears the store and inserts the given records.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Store`](crate::BackupError::Store) when
    /// the apply step is rejected as a whole.
    fn replace_all(&self, records: &[PasswordRecord]) -> BackupResult<()>;

    /// Deletes every record in the store.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Store`](crate::BackupError::Store) when
    /// the wipe is rejected.
    fn delete_all(&self) -> BackupResult<()>;
}

/// The dual-location byte sink and source for backup files.
///
/// The private location is the durability backstop and is expected to
/// always be writable; the shared location may be absent (no mounted
/// volume, no permission, platform restriction).
pub trait BackupFileStore {
    /// Writes a backup file to the private location, returning its full
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`](crate::BackupError::Storage)
    /// when the write fails.
    fn write_private(&self, file_name: &str, bytes: &[u8]) -> BackupResult<String>;

    /// Attempts to write a backup file to the shared location.
    ///
    /// Returns `Ok(None)` when the shared location is unavailable; the
    /// caller treats that as a skip, not a failure.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`](crate::BackupError::Storage)
    /// when the location was available but the write failed.
    fn write_shared(&self, file_name: &str, bytes: &[u8]) -> BackupResult<Option<String>>;

    /// Reads the raw bytes of a backup file from a previously returned
    /// path or a user-selected location.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`](crate::BackupError::Storage)
    /// when the source is unreadable.
    fn read_bytes(&self, location: &str) -> BackupResult<Vec<u8>>;

    /// Lists backup files across both locations, de-duplicated by file
    /// name, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`](crate::BackupError::Storage)
    /// when the locations cannot be enumerated.
    fn list_backups(&self) -> BackupResult<Vec<BackupFileInfo>>;

    /// Deletes a backup file. Returns false when nothing was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`](crate::BackupError::Storage)
    /// when the file exists but cannot be removed.
    fn delete_backup(&self, path: &str) -> BackupResult<bool>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for &T {
    fn list_all(&self) -> BackupResult<Vec<PasswordRecord>> {
        (**self).list_all()
    }

    fn insert_many(&self, records: &[PasswordRecord]) -> BackupResult<()> {
        (**self).insert_many(records)
    }

    fn replace_all(&self, records: &[PasswordRecord]) -> BackupResult<()> {
        (**self).replace_all(records)
    }

    fn delete_all(&self) -> BackupResult<()> {
        (**self).delete_all()
    }
}

impl<T: BackupFileStore + ?Sized> BackupFileStore for &T {
    fn write_private(&self, file_name: &str, bytes: &[u8]) -> BackupResult<String> {
        (**self).write_private(file_name, bytes)
    }

    fn write_shared(&self, file_name: &str, bytes: &[u8]) -> BackupResult<Option<String>> {
        (**self).write_shared(file_name, bytes)
    }

    fn read_bytes(&self, location: &str) -> BackupResult<Vec<u8>> {
        (**self).read_bytes(location)
    }

    fn list_backups(&self) -> BackupResult<Vec<BackupFileInfo>> {
        (**self).list_backups()
    }

    fn delete_backup(&self, path: &str) -> BackupResult<bool> {
        (**self).delete_backup(path)
    }
}
