//! Operation results
//!
//! Result structures returned by facade operations.

/// Completion signal of a write or append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: String,
    pub bytes_written: u64,
}

/// Confirmation of a file deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveReceipt {
    pub path: String,
}
