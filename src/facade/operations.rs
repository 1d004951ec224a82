//! Facade operations
//!
//! open/open_file/read_file/write_file/append_file/remove_file against the
//! injected provider. Each operation spawns its work onto the runtime and
//! reports through the shared dual-mode channel, so the caller picks the
//! invocation style per call: pass a completion callback, or use the
//! returned chain.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::info;

use crate::chain::Chain;
use crate::error::StorageError;
use crate::facade::dispatch::{Completion, OpChannel};
use crate::facade::options::{OpenRequest, ReadOptions, WritePayload, WriteRequest};
use crate::facade::results::{RemoveReceipt, WriteReceipt};
use crate::provider::{OpenOptions, StoreFile, StoreProvider, StoreRoot};

/// Outcome of `open_file`: a handle in the requested mode.
#[derive(Clone)]
pub enum FileAccess {
    Reader(Arc<dyn StoreFile>),
    Writer(Arc<dyn StoreFile>),
    Removed(String),
}

impl FileAccess {
    /// The underlying file handle, if the mode produced one.
    pub fn file(&self) -> Option<&Arc<dyn StoreFile>> {
        match self {
            FileAccess::Reader(file) | FileAccess::Writer(file) => Some(file),
            FileAccess::Removed(_) => None,
        }
    }
}

impl fmt::Debug for FileAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAccess::Reader(_) => write!(f, "FileAccess::Reader"),
            FileAccess::Writer(_) => write!(f, "FileAccess::Writer"),
            FileAccess::Removed(path) => write!(f, "FileAccess::Removed({})", path),
        }
    }
}

/// Uniform asynchronous storage operations over an injected provider.
pub struct StorageFacade {
    provider: Arc<dyn StoreProvider>,
}

impl Clone for StorageFacade {
    fn clone(&self) -> Self {
        StorageFacade {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl StorageFacade {
    pub fn new(provider: Arc<dyn StoreProvider>) -> Self {
        StorageFacade { provider }
    }

    /// Low-level primitive: acquire the store root and hand it to
    /// `handler`; acquisition failure flows down the completion path.
    /// Every other operation, including chunked reads and directory
    /// listings, is built on this.
    pub fn open<T, F, Fut>(&self, handler: F, completion: Option<Completion<T>>) -> Chain<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce(Arc<dyn StoreRoot>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, StorageError>> + Send + 'static,
    {
        let channel = OpChannel::new(completion);
        let chain = channel.chain();
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            let result = match provider.root().await {
                Ok(root) => handler(root).await,
                Err(error) => Err(error),
            };
            channel.complete(result);
        });
        chain
    }

    /// Resolve a file handle in read, write, or remove mode (default read).
    pub fn open_file(
        &self,
        filename: &str,
        request: OpenRequest,
        completion: Option<Completion<FileAccess>>,
    ) -> Chain<FileAccess> {
        let filename = filename.to_string();
        self.open(
            move |root| async move {
                if request.for_write {
                    let file = root
                        .get_file(&filename, OpenOptions::write(request.exclusive))
                        .await?;
                    Ok(FileAccess::Writer(file))
                } else if request.for_remove {
                    root.remove_file(&filename).await?;
                    Ok(FileAccess::Removed(filename))
                } else {
                    let file = root.get_file(&filename, OpenOptions::read()).await?;
                    Ok(FileAccess::Reader(file))
                }
            },
            completion,
        )
    }

    /// Read the file's content as text. The byte window defaults to the
    /// whole file; invalid UTF-8 is replaced rather than rejected.
    pub fn read_file(
        &self,
        filename: &str,
        options: ReadOptions,
        completion: Option<Completion<String>>,
    ) -> Chain<String> {
        let filename = filename.to_string();
        self.open(
            move |root| async move {
                let file = root.get_file(&filename, OpenOptions::read()).await?;
                let meta = file.metadata().await?;
                let start = options.start.unwrap_or(0);
                let end = options.end.unwrap_or(meta.size);
                let bytes = file.read_range(start, end).await?;
                info!("Read {} bytes from {}", bytes.len(), filename);
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            },
            completion,
        )
    }

    /// Write content to a file. Accepts a raw string or a full
    /// `WriteRequest`; the payload is normalized to bytes either way.
    /// Resolves with the write-completion receipt, not the content.
    pub fn write_file(
        &self,
        filename: &str,
        request: impl Into<WriteRequest>,
        completion: Option<Completion<WriteReceipt>>,
    ) -> Chain<WriteReceipt> {
        let request = request.into();
        let filename = filename.to_string();
        self.open(
            move |root| async move {
                let file = root
                    .get_file(&filename, OpenOptions::write(request.exclusive))
                    .await?;
                let append = request.for_append;
                let payload = request.content.into_bytes();
                let bytes_written = file.write(&payload, append).await?;
                info!(
                    "Wrote {} bytes to {} (append: {})",
                    bytes_written, filename, append
                );
                Ok(WriteReceipt {
                    path: filename,
                    bytes_written,
                })
            },
            completion,
        )
    }

    /// `write_file` with the cursor seeked to end-of-file first.
    pub fn append_file(
        &self,
        filename: &str,
        content: impl Into<WritePayload>,
        completion: Option<Completion<WriteReceipt>>,
    ) -> Chain<WriteReceipt> {
        self.write_file(filename, WriteRequest::new(content).appending(), completion)
    }

    /// Delete a file by path; rejects not-found when absent.
    pub fn remove_file(
        &self,
        filename: &str,
        completion: Option<Completion<RemoveReceipt>>,
    ) -> Chain<RemoveReceipt> {
        let filename = filename.to_string();
        self.open(
            move |root| async move {
                root.remove_file(&filename).await?;
                Ok(RemoveReceipt { path: filename })
            },
            completion,
        )
    }
}
