//! Storage provider layer
//!
//! The injected host-store interface consumed by the facade, plus a local
//! sandbox adapter backed by `tokio::fs`.

pub mod sandbox;
pub mod traits;
pub mod validation;

pub use sandbox::SandboxProvider;
pub use traits::{
    DEFAULT_QUOTA_BYTES, DirReader, EntryRecord, FileMetadata, OpenOptions, StoreFile,
    StoreProvider, StoreRoot,
};
