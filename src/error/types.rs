//! Error types
//!
//! Fixed taxonomy for storage failures, translated from raw host errors.
//! Failures are never thrown synchronously; they travel through the
//! completion channel as the callback's error argument or the chain's
//! rejection value.

use std::fmt;
use std::io;

/// Storage operation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    QuotaExceeded(String),
    NotFound(String),
    PermissionDenied(String),
    InvalidModification(String),
    InvalidState(String),
    Unknown(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QuotaExceeded(m) => write!(f, "Quota exceeded: {}", m),
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::PermissionDenied(p) => write!(f, "Permission denied: {}", p),
            StorageError::InvalidModification(p) => write!(f, "Invalid modification: {}", p),
            StorageError::InvalidState(m) => write!(f, "Invalid state: {}", m),
            StorageError::Unknown(m) => write!(f, "Unknown error: {}", m),
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    /// Short identifier for the error class, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::QuotaExceeded(_) => "quota-exceeded",
            StorageError::NotFound(_) => "not-found",
            StorageError::PermissionDenied(_) => "permission-denied",
            StorageError::InvalidModification(_) => "invalid-modification",
            StorageError::InvalidState(_) => "invalid-state",
            StorageError::Unknown(_) => "unknown",
        }
    }

    /// True when the failure is the exclusive-write collision class.
    pub fn is_collision(&self) -> bool {
        matches!(self, StorageError::InvalidModification(_))
    }
}

// Translate raw host errors into the fixed taxonomy.
impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        let msg = error.to_string();
        match error.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(msg),
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(msg),
            io::ErrorKind::AlreadyExists => StorageError::InvalidModification(msg),
            io::ErrorKind::StorageFull => StorageError::QuotaExceeded(msg),
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                StorageError::InvalidState(msg)
            }
            _ => StorageError::Unknown(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_translation() {
        let err: StorageError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "not-found");

        let err: StorageError = io::Error::new(io::ErrorKind::AlreadyExists, "taken").into();
        assert_eq!(err.kind(), "invalid-modification");
        assert!(err.is_collision());

        let err: StorageError = io::Error::other("mystery").into();
        assert_eq!(err.kind(), "unknown");
    }
}
