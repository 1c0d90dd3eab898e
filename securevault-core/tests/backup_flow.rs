//! End-to-end backup/restore flows over the in-memory platform.

use securevault_core::platform::memory::{MemoryCredentialStore, MemoryFileStore};
use securevault_core::platform::{CredentialStore, FsFileStore};
use securevault_core::{BackupEnvelope, BackupError, BackupService, PasswordRecord};

fn record(id: &str, title: &str) -> PasswordRecord {
    PasswordRecord {
        id: id.to_owned(),
        title: title.to_owned(),
        username: "u1".into(),
        password: "p1".into(),
        notes: String::new(),
        created_at: 1000,
        updated_at: 1000,
    }
}

fn create_backup_bytes(
    records: Vec<PasswordRecord>,
    password: &str,
) -> (MemoryCredentialStore, MemoryFileStore, Vec<u8>) {
    let store = MemoryCredentialStore::with_records(records);
    let files = MemoryFileStore::new();
    let report = BackupService::new(&store, &files)
        .create(password, Some("flow.backup"), false)
        .unwrap();
    let raw = files
        .bytes_at(report.location.fallback_path.as_deref().unwrap())
        .unwrap();
    (store, files, raw)
}

#[test]
fn create_then_restore_reproduces_records_exactly() {
    let originals = vec![
        record("a", "Gmail"),
        PasswordRecord {
            id: "b".into(),
            title: "Bank".into(),
            username: "user@bank".into(),
            password: "s3cret!".into(),
            notes: "security questions in safe".into(),
            created_at: 1_700_000_000_123,
            updated_at: 1_700_000_000_456,
        },
    ];
    let (_, _, raw) = create_backup_bytes(originals.clone(), "correct-horse");

    let target = MemoryCredentialStore::new();
    let files = MemoryFileStore::new();
    let report = BackupService::new(&target, &files)
        .restore(&raw, "correct-horse", true)
        .unwrap();

    assert_eq!(report.total_in_backup, 2);
    assert_eq!(report.restored_count, 2);
    assert_eq!(target.snapshot(), originals);
}

#[test]
fn wrong_password_is_rejected_and_store_unchanged() {
    let (_, _, raw) = create_backup_bytes(vec![record("a", "Gmail")], "correct-horse");

    let target = MemoryCredentialStore::with_records(vec![record("keep", "Existing")]);
    let files = MemoryFileStore::new();
    let service = BackupService::new(&target, &files);

    for wrong in ["wrong-pass", "correct-hors", "correct-horse "] {
        let result = service.restore(&raw, wrong, true);
        assert!(
            matches!(result, Err(BackupError::InvalidPassword)),
            "password {wrong:?} must be rejected"
        );
    }
    assert_eq!(target.snapshot(), vec![record("keep", "Existing")]);
}

#[test]
fn end_to_end_scenario_from_single_record() {
    let store = MemoryCredentialStore::with_records(vec![record("a", "Gmail")]);
    let files = MemoryFileStore::new();
    let service = BackupService::new(&store, &files);

    let created = service
        .create("correct-horse", Some("e2e.backup"), false)
        .unwrap();
    assert_eq!(created.password_count, 1);

    let raw = files
        .bytes_at(created.location.fallback_path.as_deref().unwrap())
        .unwrap();

    let restored = service.restore(&raw, "correct-horse", true).unwrap();
    assert_eq!(restored.total_in_backup, 1);
    assert_eq!(restored.restored_count, 1);
    assert_eq!(store.snapshot(), vec![record("a", "Gmail")]);

    let rejected = service.restore(&raw, "wrong-pass", true);
    assert!(matches!(rejected, Err(BackupError::InvalidPassword)));
    assert_eq!(store.snapshot(), vec![record("a", "Gmail")]);
}

#[test]
fn merge_keeps_existing_records_replace_drops_them() {
    let (_, _, raw) = create_backup_bytes(vec![record("b", "New")], "correct-horse");

    // Merge: both records survive.
    let target = MemoryCredentialStore::with_records(vec![record("a", "Old")]);
    let files = MemoryFileStore::new();
    BackupService::new(&target, &files)
        .restore(&raw, "correct-horse", false)
        .unwrap();
    let ids: Vec<String> = target.snapshot().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["a", "b"]);

    // Replace: only the backup's record survives.
    let target = MemoryCredentialStore::with_records(vec![record("a", "Old")]);
    BackupService::new(&target, &files)
        .restore(&raw, "correct-horse", true)
        .unwrap();
    let ids: Vec<String> = target.snapshot().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["b"]);
}

#[test]
fn merge_overwrites_colliding_ids() {
    let mut incoming = record("a", "Gmail");
    incoming.password = "rotated".into();
    let (_, _, raw) = create_backup_bytes(vec![incoming.clone()], "correct-horse");

    let target = MemoryCredentialStore::with_records(vec![record("a", "Gmail")]);
    let files = MemoryFileStore::new();
    BackupService::new(&target, &files)
        .restore(&raw, "correct-horse", false)
        .unwrap();

    assert_eq!(target.snapshot(), vec![incoming]);
}

#[test]
fn truncated_payload_is_invalid_file_not_invalid_password() {
    let (_, _, raw) = create_backup_bytes(vec![record("a", "Gmail")], "correct-horse");

    let mut envelope = BackupEnvelope::parse(&raw).unwrap();
    let payload = envelope.payload().unwrap();
    envelope.data = {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(&payload[..47])
    };
    let truncated = envelope.to_json().unwrap();

    let target = MemoryCredentialStore::new();
    let files = MemoryFileStore::new();
    let result = BackupService::new(&target, &files).restore(&truncated, "correct-horse", true);
    assert!(matches!(result, Err(BackupError::InvalidFile { .. })));
}

#[test]
fn missing_encrypted_field_is_invalid_file() {
    let (_, _, raw) = create_backup_bytes(vec![record("a", "Gmail")], "correct-horse");

    let mut doc: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    doc.as_object_mut().unwrap().remove("encrypted");
    let stripped = serde_json::to_vec(&doc).unwrap();

    let target = MemoryCredentialStore::new();
    let files = MemoryFileStore::new();
    let result = BackupService::new(&target, &files).restore(&stripped, "correct-horse", true);
    assert!(matches!(result, Err(BackupError::InvalidFile { .. })));
}

#[test]
fn restore_from_file_roundtrips_through_real_filesystem() {
    let tmp = tempfile::tempdir().unwrap();
    let files = FsFileStore::new(
        tmp.path().join("private"),
        Some(tmp.path().join("shared")),
    );
    let store = MemoryCredentialStore::with_records(vec![record("a", "Gmail")]);
    let service = BackupService::new(&store, &files);

    let report = service.create("correct-horse", None, false).unwrap();
    assert!(report.location.primary_available);
    let location = report.location.primary_path.unwrap();

    store.delete_all().unwrap();
    let restored = service
        .restore_from_file(&location, "correct-horse", true)
        .unwrap();
    assert_eq!(restored.restored_count, 1);
    assert_eq!(store.snapshot(), vec![record("a", "Gmail")]);
}

#[test]
fn validate_file_checks_password_without_applying() {
    let tmp = tempfile::tempdir().unwrap();
    let files = FsFileStore::new(tmp.path().join("private"), None);
    let store = MemoryCredentialStore::with_records(vec![record("a", "Gmail")]);
    let service = BackupService::new(&store, &files);

    let report = service.create("correct-horse", None, false).unwrap();
    let location = report.location.fallback_path.unwrap();

    let envelope = service.validate_file(&location, "correct-horse").unwrap();
    assert_eq!(envelope.password_count, 1);
    assert!(service.validate_file(&location, "wrong-pass").is_none());
    assert!(service.validate_file("/nonexistent/x.backup", "correct-horse").is_none());
}

#[test]
fn unreadable_source_is_a_storage_error() {
    let files = MemoryFileStore::new();
    let store = MemoryCredentialStore::new();
    let result = BackupService::new(&store, &files).restore_from_file(
        "private/missing.backup",
        "correct-horse",
        true,
    );
    assert!(matches!(result, Err(BackupError::Storage { .. })));
}
