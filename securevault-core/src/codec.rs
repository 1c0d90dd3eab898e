//! Plaintext record list serialization.
//!
//! The payload inside an envelope is, after decryption, a UTF-8 JSON
//! array of credential records. A decode failure here is an
//! [`InvalidFile`](crate::BackupError::InvalidFile) signal, distinct
//! from a decryption failure: the password was right but the payload
//! structure is not what this version expects.

use crate::error::{BackupError, BackupResult};
use crate::types::PasswordRecord;

/// Serializes a record list to the interchange JSON bytes.
///
/// All fields round-trip exactly, timestamps as 64-bit integers.
///
/// # Errors
///
/// Returns [`BackupError::Internal`] if serialization fails, which
/// cannot happen for well-formed records.
pub fn encode(records: &[PasswordRecord]) -> BackupResult<Vec<u8>> {
    serde_json::to_vec(records)
        .map_err(|e| BackupError::internal(format!("record serialization failed: {e}")))
}

/// Deserializes a record list from decrypted payload bytes.
///
/// # Errors
///
/// Returns [`BackupError::InvalidFile`] when the payload is not a valid
/// record array (missing field, wrong type, incompatible producer).
pub fn decode(bytes: &[u8]) -> BackupResult<Vec<PasswordRecord>> {
    serde_json::from_slice(bytes)
        .map_err(|e| BackupError::invalid_file(format!("invalid password data in backup: {e}")))
}
