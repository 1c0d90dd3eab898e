//! JSON-file credential store for the developer CLI.
//!
//! The real applications keep records in a platform database; the CLI
//! keeps a plain JSON file so backup flows can be exercised end to end.
//! Writes go through a temp-file-then-rename so `replace_all` is atomic
//! at the filesystem level.

use std::fs;
use std::path::PathBuf;

use securevault_core::platform::CredentialStore;
use securevault_core::{BackupError, BackupResult, PasswordRecord};

/// Credential store persisted as a single JSON array on disk.
pub struct JsonVaultStore {
    path: PathBuf,
}

impl JsonVaultStore {
    /// Creates a store over the given file path. The file is created on
    /// first write.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> BackupResult<Vec<PasswordRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&self.path)
            .map_err(|e| BackupError::store(format!("cannot read vault file: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| BackupError::store(format!("vault file is corrupt: {e}")))
    }

    fn save(&self, records: &[PasswordRecord]) -> BackupResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BackupError::store(format!("cannot create vault dir: {e}")))?;
        }
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| BackupError::store(format!("cannot serialize vault: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .map_err(|e| BackupError::store(format!("cannot write vault file: {e}")))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| BackupError::store(format!("cannot replace vault file: {e}")))
    }
}

impl CredentialStore for JsonVaultStore {
    fn list_all(&self) -> BackupResult<Vec<PasswordRecord>> {
        self.load()
    }

    fn insert_many(&self, records: &[PasswordRecord]) -> BackupResult<()> {
        let mut all = self.load()?;
        for record in records {
            if let Some(existing) = all.iter_mut().find(|r| r.id == record.id) {
                *existing = record.clone();
            } else {
                all.push(record.clone());
            }
        }
        self.save(&all)
    }

    fn replace_all(&self, records: &[PasswordRecord]) -> BackupResult<()> {
        self.save(records)
    }

    fn delete_all(&self) -> BackupResult<()> {
        self.save(&[])
    }
}
