//! Core value types for the backup subsystem.
//!
//! These are the records exchanged with the external credential store and
//! the structured reports returned by backup operations.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single credential record as stored by the vault and carried inside
/// backups.
///
/// The `id` is an opaque unique string that stays stable across edits;
/// uniqueness is enforced by the external store, not by this subsystem.
/// Timestamps are wall-clock milliseconds since the Unix epoch, matching
/// the mobile producers' plaintext format exactly so that all fields
/// round-trip through a backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordRecord {
    /// Opaque unique identifier, immutable once created.
    pub id: String,
    /// Display title (e.g. the site or service name).
    pub title: String,
    /// Login name for the credential.
    pub username: String,
    /// The secret value itself.
    pub password: String,
    /// Free-text notes.
    pub notes: String,
    /// Creation time, milliseconds since epoch.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Last update time, milliseconds since epoch. Always >= `created_at`.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl PasswordRecord {
    /// Creates a new record with a random UUID id and current timestamps.
    #[must_use]
    pub fn new(title: &str, username: &str, password: &str, notes: &str) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_owned(),
            username: username.to_owned(),
            password: password.to_owned(),
            notes: notes.to_owned(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Where a freshly created backup ended up.
///
/// Computed once per create operation and returned to the caller; never
/// persisted. The private location is the durability backstop and is
/// expected to always be writable, so `fallback_path` is only absent in
/// the degenerate case where the private write failed but the shared
/// write succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocationReport {
    /// Path in the shared/public location, when that write succeeded.
    pub primary_path: Option<String>,
    /// Path in the private location.
    pub fallback_path: Option<String>,
    /// Whether the shared/public location was available at write time.
    pub primary_available: bool,
}

impl StorageLocationReport {
    /// The path a user should be pointed at: the shared location when it
    /// was written, otherwise the private one.
    #[must_use]
    pub fn best_path(&self) -> Option<&str> {
        self.primary_path
            .as_deref()
            .or(self.fallback_path.as_deref())
    }

    /// Human-readable description of where the backup was saved.
    #[must_use]
    pub fn location_description(&self) -> String {
        self.primary_path.as_ref().map_or_else(
            || "Backup saved to internal storage".to_owned(),
            |path| format!("Backup saved to {path}"),
        )
    }
}

/// Successful outcome of a create operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    /// Name of the backup file that was written.
    pub file_name: String,
    /// Which locations the file landed in.
    pub location: StorageLocationReport,
    /// Number of records carried by the backup.
    pub password_count: usize,
    /// Set when delete-after-backup was requested and the wipe failed.
    /// The backup itself is still durable; this never invalidates it.
    pub wipe_warning: Option<String>,
}

/// Successful outcome of a restore operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    /// Record count carried by the backup.
    pub total_in_backup: usize,
    /// Records actually persisted to the credential store. Equal to
    /// `total_in_backup` as long as the store's apply step is
    /// all-or-nothing.
    pub restored_count: usize,
}

/// Metadata about an existing backup file, for listing and retention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFileInfo {
    /// File name (without directory).
    pub name: String,
    /// Full path usable as a read location.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Last-modified time, milliseconds since epoch.
    pub modified_ms: i64,
    /// True when the file lives in the shared/public location.
    pub shared: bool,
}

impl BackupFileInfo {
    /// File size rendered for display (B / KB / MB).
    #[must_use]
    pub fn formatted_size(&self) -> String {
        match self.size {
            s if s < 1024 => format!("{s} B"),
            s if s < 1024 * 1024 => format!("{} KB", s / 1024),
            s => format!("{} MB", s / (1024 * 1024)),
        }
    }
}
