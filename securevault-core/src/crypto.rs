//! Key derivation and authenticated payload encryption.
//!
//! Backups are protected with PBKDF2-HMAC-SHA256 key derivation and
//! AES-256-CBC with PKCS#7 padding, matching the iOS and Android
//! producers byte for byte. CBC carries no built-in integrity tag, so a
//! padding failure on decrypt is the operative wrong-password signal;
//! the envelope-level checks (record count, decode success) provide the
//! remaining integrity assurance.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{BackupError, BackupResult};
use crate::format::{IV_SIZE, KEY_SIZE, MIN_PAYLOAD_SIZE, PBKDF2_ITERATIONS, SALT_SIZE};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Symmetric backup encryption key (256-bit), derived from the user's
/// password and a per-backup random salt.
///
/// The key is zeroized on drop and never logged or serialized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BackupKey([u8; KEY_SIZE]);

impl BackupKey {
    /// Creates a key from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for BackupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derives the backup key from a password and salt.
///
/// PBKDF2-HMAC-SHA256 with a fixed iteration count. The parameters are
/// part of the file format and the same (password, salt) pair always
/// yields the same key.
#[must_use]
pub fn derive_key(password: &str, salt: &[u8; SALT_SIZE]) -> BackupKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    BackupKey::from_bytes(key)
}

/// Generates a random PBKDF2 salt.
///
/// # Panics
///
/// Panics if the system's random number generator fails.
#[must_use]
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    getrandom::getrandom(&mut salt).expect("getrandom failed");
    salt
}

/// Generates a random CBC initialization vector.
///
/// # Panics
///
/// Panics if the system's random number generator fails.
#[must_use]
pub fn generate_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    getrandom::getrandom(&mut iv).expect("getrandom failed");
    iv
}

/// Encrypts a plaintext payload under the given key.
///
/// A fresh random IV is generated per call and never reused, even for
/// the same key.
///
/// # Returns
///
/// A tuple of (IV, ciphertext).
///
/// # Panics
///
/// Never panics in practice: key and IV lengths are fixed by
/// construction.
#[must_use]
pub fn encrypt(plaintext: &[u8], key: &BackupKey) -> ([u8; IV_SIZE], Vec<u8>) {
    let iv = generate_iv();
    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .expect("key and IV lengths are fixed");
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    (iv, ciphertext)
}

/// Decrypts a ciphertext produced by [`encrypt`].
///
/// # Errors
///
/// Returns [`BackupError::InvalidPassword`] when padding is invalid or
/// the cipher rejects the input; with CBC this is the only
/// wrong-password signal available at this layer.
///
/// # Panics
///
/// Never panics in practice: key and IV lengths are fixed by
/// construction.
pub fn decrypt(
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
    key: &BackupKey,
) -> BackupResult<Vec<u8>> {
    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), iv)
        .expect("key and IV lengths are fixed");
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| BackupError::InvalidPassword)
}

/// Encrypts a payload with a password, producing the self-contained
/// `salt ‖ iv ‖ ciphertext` blob carried by the envelope.
#[must_use]
pub fn seal(plaintext: &[u8], password: &str) -> Vec<u8> {
    let salt = generate_salt();
    let key = derive_key(password, &salt);
    let (iv, ciphertext) = encrypt(plaintext, &key);

    let mut blob = Vec::with_capacity(SALT_SIZE + IV_SIZE + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&iv);
    blob.extend_from_slice(&ciphertext);
    blob
}

/// Decrypts a `salt ‖ iv ‖ ciphertext` blob produced by [`seal`].
///
/// # Errors
///
/// Returns [`BackupError::InvalidFile`] when the blob is shorter than
/// the salt-plus-IV floor (rejected before any cryptographic work), and
/// [`BackupError::InvalidPassword`] when decryption itself fails.
///
/// # Panics
///
/// Never panics in practice: the slice-to-array conversions cover
/// lengths checked just above.
pub fn open(blob: &[u8], password: &str) -> BackupResult<Vec<u8>> {
    if blob.len() < MIN_PAYLOAD_SIZE {
        return Err(BackupError::invalid_file(format!(
            "encrypted payload is {} bytes, expected at least {MIN_PAYLOAD_SIZE}",
            blob.len()
        )));
    }

    let salt: [u8; SALT_SIZE] = blob[..SALT_SIZE]
        .try_into()
        .expect("length checked above");
    let iv: [u8; IV_SIZE] = blob[SALT_SIZE..MIN_PAYLOAD_SIZE]
        .try_into()
        .expect("length checked above");
    let ciphertext = &blob[MIN_PAYLOAD_SIZE..];

    let key = derive_key(password, &salt);
    decrypt(&iv, ciphertext, &key)
}
