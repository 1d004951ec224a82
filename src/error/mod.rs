//! Error types
//!
//! Defines the fixed error taxonomy surfaced by every storage operation.

pub mod handlers;
pub mod types;

pub use handlers::report_error;
pub use types::StorageError;
