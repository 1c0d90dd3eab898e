//! Filesystem-backed [`BackupFileStore`].
//!
//! Backed by two plain directories: a private one (app-internal
//! storage) that is created on demand and treated as always writable,
//! and an optional shared one (a Downloads-style public folder) that
//! may be missing, unmounted, or read-only.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tracing::debug;

use crate::error::{BackupError, BackupResult};
use crate::format::BACKUP_EXTENSION;
use crate::types::BackupFileInfo;

use super::BackupFileStore;

/// Dual-directory backup file store.
pub struct FsFileStore {
    private_dir: PathBuf,
    shared_dir: Option<PathBuf>,
}

impl FsFileStore {
    /// Creates a store over a private directory and an optional shared
    /// directory. Neither needs to exist yet; they are created on first
    /// write.
    #[must_use]
    pub const fn new(private_dir: PathBuf, shared_dir: Option<PathBuf>) -> Self {
        Self {
            private_dir,
            shared_dir,
        }
    }

    fn write_to(dir: &Path, file_name: &str, bytes: &[u8]) -> BackupResult<String> {
        fs::create_dir_all(dir).map_err(|e| {
            BackupError::storage(format!("cannot create {}: {e}", dir.display()))
        })?;
        let path = dir.join(file_name);
        fs::write(&path, bytes)
            .map_err(|e| BackupError::storage(format!("cannot write {}: {e}", path.display())))?;
        Ok(path.display().to_string())
    }

    fn scan_dir(dir: &Path, shared: bool, out: &mut Vec<BackupFileInfo>) -> BackupResult<()> {
        if !dir.is_dir() {
            return Ok(());
        }
        let entries = fs::read_dir(dir)
            .map_err(|e| BackupError::storage(format!("cannot list {}: {e}", dir.display())))?;
        for entry in entries {
            let entry = entry
                .map_err(|e| BackupError::storage(format!("cannot list {}: {e}", dir.display())))?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !path.is_file() || !name.ends_with(BACKUP_EXTENSION) {
                continue;
            }
            let metadata = entry.metadata().map_err(|e| {
                BackupError::storage(format!("cannot stat {}: {e}", path.display()))
            })?;
            let modified_ms = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .and_then(|d| i64::try_from(d.as_millis()).ok())
                .unwrap_or(0);
            out.push(BackupFileInfo {
                name: name.to_owned(),
                path: path.display().to_string(),
                size: metadata.len(),
                modified_ms,
                shared,
            });
        }
        Ok(())
    }
}

impl BackupFileStore for FsFileStore {
    fn write_private(&self, file_name: &str, bytes: &[u8]) -> BackupResult<String> {
        Self::write_to(&self.private_dir, file_name, bytes)
    }

    fn write_shared(&self, file_name: &str, bytes: &[u8]) -> BackupResult<Option<String>> {
        let Some(dir) = self.shared_dir.as_deref() else {
            debug!("no shared backup directory configured");
            return Ok(None);
        };
        Self::write_to(dir, file_name, bytes).map(Some)
    }

    fn read_bytes(&self, location: &str) -> BackupResult<Vec<u8>> {
        fs::read(location)
            .map_err(|e| BackupError::storage(format!("cannot read {location}: {e}")))
    }

    fn list_backups(&self) -> BackupResult<Vec<BackupFileInfo>> {
        let mut all = Vec::new();
        Self::scan_dir(&self.private_dir, false, &mut all)?;
        if let Some(dir) = self.shared_dir.as_deref() {
            Self::scan_dir(dir, true, &mut all)?;
        }

        // De-duplicate by name, keeping the newest copy.
        let mut by_name: HashMap<String, BackupFileInfo> = HashMap::new();
        for info in all {
            let keep = by_name
                .get(&info.name)
                .map_or(true, |existing| existing.modified_ms < info.modified_ms);
            if keep {
                by_name.insert(info.name.clone(), info);
            }
        }
        let mut list: Vec<BackupFileInfo> = by_name.into_values().collect();
        list.sort_by(|a, b| b.modified_ms.cmp(&a.modified_ms));
        Ok(list)
    }

    fn delete_backup(&self, path: &str) -> BackupResult<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BackupError::storage(format!("cannot delete {path}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsFileStore::new(tmp.path().join("private"), None);

        let path = store.write_private("a.backup", b"hello").unwrap();
        assert_eq!(store.read_bytes(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_shared_absent_is_a_skip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsFileStore::new(tmp.path().join("private"), None);
        assert_eq!(store.write_shared("a.backup", b"hello").unwrap(), None);
    }

    #[test]
    fn test_shared_write_lands_in_shared_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let shared = tmp.path().join("shared");
        let store = FsFileStore::new(tmp.path().join("private"), Some(shared.clone()));

        let path = store.write_shared("a.backup", b"hello").unwrap().unwrap();
        assert!(path.starts_with(shared.display().to_string().as_str()));
    }

    #[test]
    fn test_list_filters_by_extension_and_dedupes() {
        let tmp = tempfile::tempdir().unwrap();
        let shared = tmp.path().join("shared");
        let store = FsFileStore::new(tmp.path().join("private"), Some(shared));

        store.write_private("keep.backup", b"1").unwrap();
        store.write_private("ignore.txt", b"2").unwrap();
        store.write_shared("keep.backup", b"1").unwrap();

        let list = store.list_backups().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "keep.backup");
    }

    #[test]
    fn test_delete_missing_is_false() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsFileStore::new(tmp.path().join("private"), None);
        let missing = tmp.path().join("nope.backup");
        assert!(!store.delete_backup(&missing.display().to_string()).unwrap());
    }
}
