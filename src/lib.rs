//! sandfs
//!
//! A uniform asynchronous storage abstraction over a sandboxed,
//! quota-bounded byte store. Every operation supports two interchangeable
//! invocation styles: an explicit completion callback, or an awaitable
//! chain with sequential composition.

pub mod chain;
pub mod config;
pub mod error;
pub mod facade;
pub mod provider;
pub mod quota;

pub use chain::{Chain, Step};
pub use config::StoreConfig;
pub use error::StorageError;
pub use facade::{
    ChunkedReader, Completion, DirectoryAggregator, FileHandle, OpenRequest, ReadOptions,
    StorageFacade, WritePayload, WriteRequest,
};
pub use provider::SandboxProvider;
pub use quota::QuotaManager;
