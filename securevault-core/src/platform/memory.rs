//! In-memory implementations of the collaborator traits for testing.
//!
//! These implementations are NOT meant for production use. They exist
//! to exercise the backup engine without a real database or filesystem,
//! including injected failures for the error paths.

// Test-support code; lock poisoning cannot happen in these single-purpose tests.
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::cast_possible_truncation)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use crate::error::{BackupError, BackupResult};
use crate::types::{BackupFileInfo, PasswordRecord};

use super::{BackupFileStore, CredentialStore};

/// In-memory credential store backed by an ordered `Vec`.
///
/// Keeps insertion order so tests stay deterministic. `fail_mutations`
/// makes every mutating call return a store error, for exercising the
/// delete-after-backup warning and restore apply failures.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: Mutex<Vec<PasswordRecord>>,
    fail_mutations: AtomicBool,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given records.
    #[must_use]
    pub fn with_records(records: Vec<PasswordRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            fail_mutations: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent mutating call fail.
    pub fn set_fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the current contents, for assertions.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PasswordRecord> {
        self.records.lock().expect("store lock").clone()
    }

    fn check_mutation(&self) -> BackupResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(BackupError::store("injected mutation failure"));
        }
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn list_all(&self) -> BackupResult<Vec<PasswordRecord>> {
        Ok(self.records.lock().expect("store lock").clone())
    }

    fn insert_many(&self, records: &[PasswordRecord]) -> BackupResult<()> {
        self.check_mutation()?;
        let mut guard = self.records.lock().expect("store lock");
        for record in records {
            if let Some(existing) = guard.iter_mut().find(|r| r.id == record.id) {
                *existing = record.clone();
            } else {
                guard.push(record.clone());
            }
        }
        Ok(())
    }

    fn replace_all(&self, records: &[PasswordRecord]) -> BackupResult<()> {
        self.check_mutation()?;
        // Single assignment under the lock: readers never observe the
        // cleared intermediate state.
        *self.records.lock().expect("store lock") = records.to_vec();
        Ok(())
    }

    fn delete_all(&self) -> BackupResult<()> {
        self.check_mutation()?;
        self.records.lock().expect("store lock").clear();
        Ok(())
    }
}

/// In-memory dual-location file store.
///
/// Files live under synthetic `private/` and `shared/` path prefixes.
/// The shared location can be toggled unavailable, and either location
/// can be made to fail writes outright.
pub struct MemoryFileStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    shared_enabled: AtomicBool,
    fail_private: AtomicBool,
    fail_shared: AtomicBool,
    clock: AtomicI64,
    modified: Mutex<HashMap<String, i64>>,
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileStore {
    /// Creates a store with the shared location available.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            shared_enabled: AtomicBool::new(true),
            fail_private: AtomicBool::new(false),
            fail_shared: AtomicBool::new(false),
            clock: AtomicI64::new(0),
            modified: Mutex::new(HashMap::new()),
        }
    }

    /// Toggles shared-location availability.
    pub fn set_shared_enabled(&self, enabled: bool) {
        self.shared_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Makes private writes fail.
    pub fn set_fail_private(&self, fail: bool) {
        self.fail_private.store(fail, Ordering::SeqCst);
    }

    /// Makes shared writes fail (while the location stays "available").
    pub fn set_fail_shared(&self, fail: bool) {
        self.fail_shared.store(fail, Ordering::SeqCst);
    }

    /// Number of stored files, for assertions.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.lock().expect("file lock").len()
    }

    /// Returns the stored bytes at a path, for assertions.
    #[must_use]
    pub fn bytes_at(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().expect("file lock").get(path).cloned()
    }

    fn put(&self, path: String, bytes: &[u8]) {
        let stamp = self.clock.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .expect("file lock")
            .insert(path.clone(), bytes.to_vec());
        self.modified.lock().expect("mtime lock").insert(path, stamp);
    }
}

impl BackupFileStore for MemoryFileStore {
    fn write_private(&self, file_name: &str, bytes: &[u8]) -> BackupResult<String> {
        if self.fail_private.load(Ordering::SeqCst) {
            return Err(BackupError::storage("injected private write failure"));
        }
        let path = format!("private/{file_name}");
        self.put(path.clone(), bytes);
        Ok(path)
    }

    fn write_shared(&self, file_name: &str, bytes: &[u8]) -> BackupResult<Option<String>> {
        if !self.shared_enabled.load(Ordering::SeqCst) {
            return Ok(None);
        }
        if self.fail_shared.load(Ordering::SeqCst) {
            return Err(BackupError::storage("injected shared write failure"));
        }
        let path = format!("shared/{file_name}");
        self.put(path.clone(), bytes);
        Ok(Some(path))
    }

    fn read_bytes(&self, location: &str) -> BackupResult<Vec<u8>> {
        self.files
            .lock()
            .expect("file lock")
            .get(location)
            .cloned()
            .ok_or_else(|| BackupError::storage(format!("no such file: {location}")))
    }

    fn list_backups(&self) -> BackupResult<Vec<BackupFileInfo>> {
        let files = self.files.lock().expect("file lock");
        let modified = self.modified.lock().expect("mtime lock");

        let mut by_name: HashMap<String, BackupFileInfo> = HashMap::new();
        for (path, bytes) in &*files {
            let (shared, name) = path
                .split_once('/')
                .map_or((false, path.as_str()), |(dir, name)| {
                    (dir == "shared", name)
                });
            let info = BackupFileInfo {
                name: name.to_owned(),
                path: path.clone(),
                size: bytes.len() as u64,
                modified_ms: modified.get(path).copied().unwrap_or(0),
                shared,
            };
            let keep = by_name
                .get(name)
                .map_or(true, |existing| existing.modified_ms < info.modified_ms);
            if keep {
                by_name.insert(name.to_owned(), info);
            }
        }

        let mut list: Vec<BackupFileInfo> = by_name.into_values().collect();
        list.sort_by(|a, b| b.modified_ms.cmp(&a.modified_ms));
        Ok(list)
    }

    fn delete_backup(&self, path: &str) -> BackupResult<bool> {
        let removed = self.files.lock().expect("file lock").remove(path).is_some();
        self.modified.lock().expect("mtime lock").remove(path);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_many_upserts_by_id() {
        let store = MemoryCredentialStore::new();
        let a = PasswordRecord::new("Gmail", "u1", "p1", "");
        store.insert_many(std::slice::from_ref(&a)).unwrap();

        let mut edited = a.clone();
        edited.password = "p2".into();
        let b = PasswordRecord::new("Bank", "u2", "p2", "");
        store.insert_many(&[edited.clone(), b.clone()]).unwrap();

        let contents = store.snapshot();
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0], edited);
        assert_eq!(contents[1], b);
    }

    #[test]
    fn test_replace_all_clears_previous_contents() {
        let store =
            MemoryCredentialStore::with_records(vec![PasswordRecord::new("Old", "u", "p", "")]);
        let fresh = PasswordRecord::new("New", "u", "p", "");
        store.replace_all(std::slice::from_ref(&fresh)).unwrap();
        assert_eq!(store.snapshot(), vec![fresh]);
    }

    #[test]
    fn test_injected_mutation_failure() {
        let store = MemoryCredentialStore::new();
        store.set_fail_mutations(true);
        assert!(store.delete_all().is_err());
        assert!(store.insert_many(&[]).is_err());
        // Reads still work.
        assert!(store.list_all().is_ok());
    }

    #[test]
    fn test_file_store_shared_toggle() {
        let files = MemoryFileStore::new();
        assert_eq!(
            files.write_shared("a.backup", b"x").unwrap(),
            Some("shared/a.backup".to_owned())
        );
        files.set_shared_enabled(false);
        assert_eq!(files.write_shared("b.backup", b"x").unwrap(), None);
    }

    #[test]
    fn test_list_backups_dedupes_and_sorts() {
        let files = MemoryFileStore::new();
        files.write_private("one.backup", b"1").unwrap();
        files.write_shared("one.backup", b"1").unwrap();
        files.write_private("two.backup", b"22").unwrap();

        let list = files.list_backups().unwrap();
        assert_eq!(list.len(), 2);
        // Newest first; the shared copy of "one" was written after the
        // private copy, so it wins the de-duplication.
        assert_eq!(list[0].name, "two.backup");
        assert_eq!(list[1].name, "one.backup");
        assert!(list[1].shared);
    }

    #[test]
    fn test_delete_backup_reports_missing() {
        let files = MemoryFileStore::new();
        files.write_private("a.backup", b"x").unwrap();
        assert!(files.delete_backup("private/a.backup").unwrap());
        assert!(!files.delete_backup("private/a.backup").unwrap());
    }
}
