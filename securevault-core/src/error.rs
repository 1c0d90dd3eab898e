//! Error types for the backup/restore subsystem.
//!
//! Every public operation returns one of these variants as an explicit
//! result value; nothing is thrown across the subsystem boundary.

use std::fmt;

/// Errors that can occur during backup and restore operations.
///
/// The variants fall into five kinds, and callers are expected to match
/// exhaustively on them:
///
/// - policy violations detected before any cryptographic work
///   ([`EmptyPassword`], [`PasswordTooShort`], [`EmptyVault`])
/// - file/structure problems ([`InvalidFile`])
/// - wrong password ([`InvalidPassword`]; a padding/cipher rejection is
///   the only wrong-password signal the CBC format provides)
/// - persistence problems ([`Storage`], [`Store`])
/// - anything unanticipated ([`Internal`])
///
/// [`EmptyPassword`]: BackupError::EmptyPassword
/// [`PasswordTooShort`]: BackupError::PasswordTooShort
/// [`EmptyVault`]: BackupError::EmptyVault
/// [`InvalidFile`]: BackupError::InvalidFile
/// [`InvalidPassword`]: BackupError::InvalidPassword
/// [`Storage`]: BackupError::Storage
/// [`Store`]: BackupError::Store
/// [`Internal`]: BackupError::Internal
#[derive(Debug)]
pub enum BackupError {
    /// The backup password is blank.
    EmptyPassword,

    /// The backup password is shorter than the enforced minimum.
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// The credential store holds no records to back up.
    EmptyVault,

    /// The backup file or decoded payload does not conform to the
    /// expected structure.
    InvalidFile {
        /// Description of what failed to validate.
        context: String,
    },

    /// Decryption was rejected (wrong password or tampered ciphertext).
    InvalidPassword,

    /// A persistence target failed: both backup locations rejected the
    /// write, or the requested read source is unreadable.
    Storage {
        /// Context describing the operation.
        context: String,
    },

    /// The external credential store rejected a whole-operation apply.
    Store {
        /// Context describing the operation.
        context: String,
    },

    /// An unanticipated internal failure. Never retried automatically.
    Internal {
        /// Description of the error.
        message: String,
    },
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "backup password cannot be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "backup password must be at least {min} characters long")
            }
            Self::EmptyVault => write!(f, "no passwords to backup"),
            Self::InvalidFile { context } => {
                write!(f, "invalid backup file format: {context}")
            }
            Self::InvalidPassword => write!(f, "invalid backup password"),
            Self::Storage { context } => write!(f, "storage failure: {context}"),
            Self::Store { context } => write!(f, "credential store failure: {context}"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for BackupError {}

impl BackupError {
    /// Creates an invalid file error.
    pub fn invalid_file<S: Into<String>>(context: S) -> Self {
        Self::InvalidFile {
            context: context.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage<S: Into<String>>(context: S) -> Self {
        Self::Storage {
            context: context.into(),
        }
    }

    /// Creates a credential store error.
    pub fn store<S: Into<String>>(context: S) -> Self {
        Self::Store {
            context: context.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when this error means the supplied password was wrong.
    #[must_use]
    pub const fn is_invalid_password(&self) -> bool {
        matches!(self, Self::InvalidPassword)
    }

    /// True when this error means the file itself is unusable.
    #[must_use]
    pub const fn is_invalid_file(&self) -> bool {
        matches!(self, Self::InvalidFile { .. })
    }
}

/// Result type alias for backup operations.
pub type BackupResult<T> = Result<T, BackupError>;
