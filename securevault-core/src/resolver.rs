//! Storage-location negotiation for freshly created backups.
//!
//! A backup is written to the private location first (that write is
//! the durability backstop) and then to the shared/public location if
//! one is reachable. The two writes are independent: a shared failure
//! never rolls back or fails the private copy, and the operation as a
//! whole succeeds as long as at least one write landed.

use chrono::Local;
use tracing::{debug, warn};

use crate::error::{BackupError, BackupResult};
use crate::format::{BACKUP_EXTENSION, BACKUP_PREFIX, FILE_TIMESTAMP_FORMAT};
use crate::platform::BackupFileStore;
use crate::types::StorageLocationReport;

/// Generates a backup file name from the fixed prefix and a
/// second-resolution local timestamp.
#[must_use]
pub fn generate_file_name() -> String {
    let timestamp = Local::now().format(FILE_TIMESTAMP_FORMAT);
    format!("{BACKUP_PREFIX}{timestamp}{BACKUP_EXTENSION}")
}

/// Decides where a backup is persisted.
pub struct StorageResolver<'a, F: ?Sized> {
    files: &'a F,
}

impl<'a, F: BackupFileStore + ?Sized> StorageResolver<'a, F> {
    /// Creates a resolver over the given file store.
    #[must_use]
    pub const fn new(files: &'a F) -> Self {
        Self { files }
    }

    /// Persists backup bytes to both locations, private first.
    ///
    /// Returns the file name used and a report of where the bytes
    /// landed.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`] only when both writes failed;
    /// a successfully encrypted payload is never lost while any target
    /// accepts it.
    pub fn persist(
        &self,
        bytes: &[u8],
        file_name: Option<&str>,
    ) -> BackupResult<(String, StorageLocationReport)> {
        let file_name = file_name.map_or_else(generate_file_name, str::to_owned);

        let fallback_path = match self.files.write_private(&file_name, bytes) {
            Ok(path) => {
                debug!(path = %path, "backup written to private storage");
                Some(path)
            }
            Err(e) => {
                warn!(error = %e, "private backup write failed");
                None
            }
        };

        let primary_path = match self.files.write_shared(&file_name, bytes) {
            Ok(Some(path)) => {
                debug!(path = %path, "backup written to shared storage");
                Some(path)
            }
            Ok(None) => {
                debug!("shared storage unavailable, keeping private copy only");
                None
            }
            Err(e) => {
                warn!(error = %e, "shared backup write failed, keeping private copy only");
                None
            }
        };

        if primary_path.is_none() && fallback_path.is_none() {
            return Err(BackupError::storage("failed to save backup file"));
        }

        let report = StorageLocationReport {
            primary_available: primary_path.is_some(),
            primary_path,
            fallback_path,
        };
        Ok((file_name, report))
    }
}
