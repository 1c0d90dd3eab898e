//! Backup service orchestration.
//!
//! [`BackupService`] wires the codec, cipher, envelope, and storage
//! resolver into the three public operations: create, validate, and
//! restore. It holds no cross-call state beyond the injected
//! collaborators; every operation is a synchronous single-shot call
//! whose outcome is returned as an explicit result value.

use tracing::{debug, info, warn};

use crate::codec;
use crate::crypto;
use crate::envelope::BackupEnvelope;
use crate::error::{BackupError, BackupResult};
use crate::format::MIN_PASSWORD_LEN;
use crate::platform::{BackupFileStore, CredentialStore};
use crate::resolver::StorageResolver;
use crate::types::{BackupFileInfo, CreateReport, RestoreReport};

/// Orchestrates encrypted backup creation, validation, and restore
/// against an injected credential store and file store.
pub struct BackupService<S, F> {
    store: S,
    files: F,
}

impl<S: CredentialStore, F: BackupFileStore> BackupService<S, F> {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub const fn new(store: S, files: F) -> Self {
        Self { store, files }
    }

    /// Creates an encrypted backup of the whole credential store.
    ///
    /// The password policy (non-blank, minimum length) is enforced
    /// before the store is touched. The backup is persisted private
    /// location first; success is reported as long as at least one
    /// location accepted the file. When `delete_after` is set, the
    /// store is wiped only after the persist step succeeded; a failed
    /// wipe surfaces as a warning inside the success report and never
    /// retroactively invalidates the backup.
    ///
    /// # Errors
    ///
    /// - [`BackupError::EmptyPassword`] / [`BackupError::PasswordTooShort`]
    ///   when the password violates policy
    /// - [`BackupError::EmptyVault`] when there is nothing to back up
    /// - [`BackupError::Storage`] when both persistence targets failed
    /// - [`BackupError::Store`] when the credential store cannot be read
    pub fn create(
        &self,
        password: &str,
        file_name: Option<&str>,
        delete_after: bool,
    ) -> BackupResult<CreateReport> {
        check_password_policy(password)?;

        let records = self.store.list_all()?;
        if records.is_empty() {
            return Err(BackupError::EmptyVault);
        }
        info!(count = records.len(), "starting backup creation");

        let plaintext = codec::encode(&records)?;
        let blob = crypto::seal(&plaintext, password);
        let envelope = BackupEnvelope::wrap(&blob, records.len());
        let bytes = envelope.to_json()?;
        debug!(size = bytes.len(), "backup envelope assembled");

        let resolver = StorageResolver::new(&self.files);
        let (file_name, location) = resolver.persist(&bytes, file_name)?;
        info!(file = %file_name, "backup created");

        let wipe_warning = if delete_after {
            match self.store.delete_all() {
                Ok(()) => {
                    info!("all passwords deleted from device after backup");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "post-backup wipe failed, backup is still durable");
                    Some(format!(
                        "backup created but failed to delete passwords from device: {e}"
                    ))
                }
            }
        } else {
            None
        };

        Ok(CreateReport {
            file_name,
            location,
            password_count: records.len(),
            wipe_warning,
        })
    }

    /// Checks a backup file and password without applying anything.
    ///
    /// Parses the envelope and attempts decryption only. Returns the
    /// envelope metadata on success, or `None` on any failure; wrong
    /// password and malformed file are deliberately indistinguishable
    /// here; this entry point exists to confirm a password before a
    /// destructive restore.
    #[must_use]
    pub fn validate(&self, raw: &[u8], password: &str) -> Option<BackupEnvelope> {
        if password.trim().is_empty() {
            return None;
        }
        let envelope = BackupEnvelope::parse(raw).ok()?;
        let blob = envelope.payload().ok()?;
        crypto::open(&blob, password).ok()?;
        Some(envelope)
    }

    /// [`validate`](Self::validate) over a stored backup file.
    #[must_use]
    pub fn validate_file(&self, location: &str, password: &str) -> Option<BackupEnvelope> {
        let raw = self.files.read_bytes(location).ok()?;
        self.validate(&raw, password)
    }

    /// Restores records from backup bytes into the credential store.
    ///
    /// With `replace_all` the store is atomically cleared and refilled;
    /// otherwise the records are merged in by id (insert-or-replace).
    ///
    /// # Errors
    ///
    /// Failures are classified by a strict tie-break: any structural
    /// problem before decryption is attempted is
    /// [`BackupError::InvalidFile`]; a decryption rejection is
    /// [`BackupError::InvalidPassword`]; a decode or record-count
    /// problem after successful decryption is again
    /// [`BackupError::InvalidFile`]. A store rejection of the apply
    /// step is [`BackupError::Store`].
    pub fn restore(
        &self,
        raw: &[u8],
        password: &str,
        replace_all: bool,
    ) -> BackupResult<RestoreReport> {
        if password.trim().is_empty() {
            return Err(BackupError::EmptyPassword);
        }

        let envelope = BackupEnvelope::parse(raw)?;
        debug!(
            version = %envelope.version,
            count = envelope.password_count,
            "parsed backup envelope"
        );

        let blob = envelope.payload()?;
        let plaintext = crypto::open(&blob, password)?;
        let records = codec::decode(&plaintext)?;

        if records.len() != envelope.password_count {
            return Err(BackupError::invalid_file(format!(
                "record count mismatch: envelope says {}, payload holds {}",
                envelope.password_count,
                records.len()
            )));
        }

        if replace_all {
            self.store.replace_all(&records)?;
        } else {
            self.store.insert_many(&records)?;
        }
        info!(count = records.len(), replace_all, "restore completed");

        Ok(RestoreReport {
            total_in_backup: records.len(),
            restored_count: records.len(),
        })
    }

    /// [`restore`](Self::restore) over a stored backup file.
    ///
    /// # Errors
    ///
    /// As [`restore`](Self::restore), plus [`BackupError::Storage`]
    /// when the file cannot be read.
    pub fn restore_from_file(
        &self,
        location: &str,
        password: &str,
        replace_all: bool,
    ) -> BackupResult<RestoreReport> {
        let raw = self.files.read_bytes(location)?;
        self.restore(&raw, password, replace_all)
    }

    /// Lists known backup files, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`] when the locations cannot be
    /// enumerated.
    pub fn list_backups(&self) -> BackupResult<Vec<BackupFileInfo>> {
        self.files.list_backups()
    }

    /// Deletes all but the `keep` newest backups. Returns the number of
    /// files removed.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Storage`] when listing or deletion fails.
    pub fn cleanup_old_backups(&self, keep: usize) -> BackupResult<usize> {
        let backups = self.files.list_backups()?;
        let mut removed = 0;
        for info in backups.iter().skip(keep) {
            if self.files.delete_backup(&info.path)? {
                debug!(file = %info.name, "cleaned up old backup");
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Enforces the create-side password policy: non-blank, then minimum
/// length, in that order.
fn check_password_policy(password: &str) -> BackupResult<()> {
    if password.trim().is_empty() {
        return Err(BackupError::EmptyPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BackupError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::platform::memory::{MemoryCredentialStore, MemoryFileStore};
    use crate::types::PasswordRecord;

    fn service_with(
        records: Vec<PasswordRecord>,
    ) -> BackupService<MemoryCredentialStore, MemoryFileStore> {
        BackupService::new(
            MemoryCredentialStore::with_records(records),
            MemoryFileStore::new(),
        )
    }

    fn one_record() -> PasswordRecord {
        PasswordRecord {
            id: "a".into(),
            title: "Gmail".into(),
            username: "u1".into(),
            password: "p1".into(),
            notes: String::new(),
            created_at: 1000,
            updated_at: 1000,
        }
    }

    #[test_case("" ; "empty password")]
    #[test_case("   " ; "blank password")]
    fn test_create_rejects_blank_password(password: &str) {
        let service = service_with(vec![one_record()]);
        let result = service.create(password, None, false);
        assert!(matches!(result, Err(BackupError::EmptyPassword)));
    }

    #[test_case("12345" ; "five characters")]
    #[test_case("a" ; "one character")]
    fn test_create_rejects_short_password(password: &str) {
        let service = service_with(vec![one_record()]);
        let result = service.create(password, None, false);
        assert!(matches!(result, Err(BackupError::PasswordTooShort { .. })));
    }

    #[test]
    fn test_create_accepts_minimum_length_password() {
        let service = service_with(vec![one_record()]);
        let report = service.create("123456", None, false).unwrap();
        assert_eq!(report.password_count, 1);
    }

    #[test]
    fn test_create_rejects_empty_vault() {
        let service = service_with(vec![]);
        let result = service.create("correct-horse", None, false);
        assert!(matches!(result, Err(BackupError::EmptyVault)));
    }

    #[test]
    fn test_create_policy_checked_before_store() {
        // A short password fails even against an empty vault: policy
        // comes first.
        let service = service_with(vec![]);
        let result = service.create("short", None, false);
        assert!(matches!(result, Err(BackupError::PasswordTooShort { .. })));
    }

    #[test]
    fn test_two_creates_produce_different_ciphertexts() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        let service = BackupService::new(&store, &files);

        let a = service.create("correct-horse", Some("a.backup"), false).unwrap();
        let b = service.create("correct-horse", Some("b.backup"), false).unwrap();

        let bytes_a = files.bytes_at(a.location.fallback_path.as_deref().unwrap());
        let bytes_b = files.bytes_at(b.location.fallback_path.as_deref().unwrap());
        let env_a = BackupEnvelope::parse(&bytes_a.unwrap()).unwrap();
        let env_b = BackupEnvelope::parse(&bytes_b.unwrap()).unwrap();
        assert_ne!(env_a.data, env_b.data);
    }

    #[test]
    fn test_delete_after_backup_wipes_store() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        let service = BackupService::new(&store, &files);

        let report = service.create("correct-horse", None, true).unwrap();
        assert!(report.wipe_warning.is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_failed_wipe_surfaces_warning_not_failure() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        let service = BackupService::new(&store, &files);

        store.set_fail_mutations(true);
        let report = service.create("correct-horse", None, true).unwrap();
        assert!(report.wipe_warning.is_some());
        assert_eq!(report.password_count, 1);
    }

    #[test]
    fn test_validate_returns_metadata_on_correct_password() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        let service = BackupService::new(&store, &files);

        let report = service.create("correct-horse", Some("v.backup"), false).unwrap();
        let raw = files
            .bytes_at(report.location.fallback_path.as_deref().unwrap())
            .unwrap();

        let envelope = service.validate(&raw, "correct-horse").unwrap();
        assert_eq!(envelope.password_count, 1);
        // Store untouched: validate never applies records.
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_validate_is_none_on_any_failure() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        let service = BackupService::new(&store, &files);

        let report = service.create("correct-horse", Some("v.backup"), false).unwrap();
        let raw = files
            .bytes_at(report.location.fallback_path.as_deref().unwrap())
            .unwrap();

        assert!(service.validate(&raw, "wrong-pass").is_none());
        assert!(service.validate(b"not a backup", "correct-horse").is_none());
        assert!(service.validate(&raw, "  ").is_none());
    }

    #[test]
    fn test_restore_rejects_record_count_mismatch() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        let service = BackupService::new(&store, &files);

        let report = service.create("correct-horse", Some("c.backup"), false).unwrap();
        let raw = files
            .bytes_at(report.location.fallback_path.as_deref().unwrap())
            .unwrap();

        // Tamper with the declared count only; the ciphertext stays valid.
        let mut envelope = BackupEnvelope::parse(&raw).unwrap();
        envelope.password_count = 7;
        let tampered = envelope.to_json().unwrap();

        let result = service.restore(&tampered, "correct-horse", true);
        assert!(matches!(result, Err(BackupError::InvalidFile { .. })));
    }

    #[test]
    fn test_restore_surfaces_store_rejection() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        let service = BackupService::new(&store, &files);

        let report = service.create("correct-horse", Some("c.backup"), false).unwrap();
        let raw = files
            .bytes_at(report.location.fallback_path.as_deref().unwrap())
            .unwrap();

        store.set_fail_mutations(true);
        let result = service.restore(&raw, "correct-horse", true);
        assert!(matches!(result, Err(BackupError::Store { .. })));
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let store = MemoryCredentialStore::with_records(vec![one_record()]);
        let files = MemoryFileStore::new();
        files.set_shared_enabled(false);
        let service = BackupService::new(&store, &files);

        for i in 0..4 {
            service
                .create("correct-horse", Some(&format!("b{i}.backup")), false)
                .unwrap();
        }
        let removed = service.cleanup_old_backups(2).unwrap();
        assert_eq!(removed, 2);

        let names: Vec<String> = service
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(names, vec!["b3.backup", "b2.backup"]);
    }
}
