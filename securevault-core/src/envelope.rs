//! The versioned backup envelope, the on-disk interchange format.
//!
//! A backup file is a UTF-8 JSON document carrying format metadata and
//! the base64-encoded ciphertext payload. The field names are shared
//! with the iOS and Android producers and must not change.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{BackupError, BackupResult};
use crate::format::{
    APP_NAME, ENVELOPE_TIMESTAMP_FORMAT, FORMAT_VERSION, MIN_PAYLOAD_SIZE, PLATFORM,
};

/// The serializable backup container: metadata plus ciphertext.
///
/// An envelope is an immutable value object; it is created by the
/// backup service, handed to storage, and parsed back on restore. The
/// `app_name` and `platform` fields are diagnostic only and are never
/// trusted for security decisions. `password_count` exists for display
/// and sanity-checking: it must equal the number of records recoverable
/// after decryption, and a mismatch is treated as corruption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEnvelope {
    /// Format version, currently `"1.0"`.
    pub version: String,
    /// Creation time as an ISO-8601 UTC string.
    pub timestamp: String,
    /// Always true for payloads produced by this subsystem; present for
    /// forward format evolution.
    pub encrypted: bool,
    /// Number of records inside the encrypted payload.
    #[serde(rename = "passwordCount")]
    pub password_count: usize,
    /// Producing application identifier (diagnostic only).
    #[serde(rename = "appName")]
    pub app_name: String,
    /// Producing platform identifier (diagnostic only).
    pub platform: String,
    /// Base64 of `salt(32) ‖ iv(16) ‖ AES-256-CBC/PKCS7 ciphertext`.
    pub data: String,
}

impl BackupEnvelope {
    /// Wraps a ciphertext payload into a fresh envelope.
    #[must_use]
    pub fn wrap(payload: &[u8], record_count: usize) -> Self {
        Self {
            version: FORMAT_VERSION.to_owned(),
            timestamp: Utc::now().format(ENVELOPE_TIMESTAMP_FORMAT).to_string(),
            encrypted: true,
            password_count: record_count,
            app_name: APP_NAME.to_owned(),
            platform: PLATFORM.to_owned(),
            data: BASE64.encode(payload),
        }
    }

    /// Parses and validates an envelope from raw file bytes.
    ///
    /// Validation covers the JSON structure, the `encrypted` flag, and
    /// the payload: it must base64-decode to at least the salt-plus-IV
    /// floor. No decryption is attempted here.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidFile`] on any violation.
    pub fn parse(raw: &[u8]) -> BackupResult<Self> {
        let envelope: Self = serde_json::from_slice(raw)
            .map_err(|e| BackupError::invalid_file(format!("not a backup document: {e}")))?;

        if !envelope.encrypted {
            return Err(BackupError::invalid_file("backup file is not encrypted"));
        }

        let payload = envelope.payload()?;
        if payload.len() < MIN_PAYLOAD_SIZE {
            return Err(BackupError::invalid_file(format!(
                "payload is {} bytes, expected at least {MIN_PAYLOAD_SIZE}",
                payload.len()
            )));
        }

        Ok(envelope)
    }

    /// Decodes the base64 ciphertext payload.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::InvalidFile`] when the `data` field is not
    /// valid base64.
    pub fn payload(&self) -> BackupResult<Vec<u8>> {
        BASE64
            .decode(&self.data)
            .map_err(|e| BackupError::invalid_file(format!("payload is not valid base64: {e}")))
    }

    /// Renders the envelope as the UTF-8 JSON bytes written to disk.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Internal`] if serialization fails, which
    /// cannot happen for a well-formed envelope.
    pub fn to_json(&self) -> BackupResult<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| BackupError::internal(format!("envelope serialization failed: {e}")))
    }
}
