//! Storage facade
//!
//! Uniform read/write/append/remove/open/list operations against an
//! injected store provider. Every operation supports both invocation
//! styles: an explicit completion callback, or the returned chain.

pub mod chunked;
pub mod dispatch;
pub mod listing;
pub mod operations;
pub mod options;
pub mod results;

pub use chunked::ChunkedReader;
pub use dispatch::Completion;
pub use listing::{DirectoryAggregator, FileHandle};
pub use operations::{FileAccess, StorageFacade};
pub use options::{OpenRequest, ReadOptions, WritePayload, WriteRequest};
pub use results::{RemoveReceipt, WriteReceipt};
