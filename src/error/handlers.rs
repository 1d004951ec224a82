//! Error handlers
//!
//! Logging helpers for surfaced storage failures. Reacting to a failure
//! (retry, UI) is the caller's responsibility; the library only reports.

use log::error;

use crate::error::types::StorageError;

/// Log a storage error with its taxonomy class.
pub fn report_error(context: &str, err: &StorageError) {
    error!("{} failed ({}): {}", context, err.kind(), err);
}
