//! Provider traits
//!
//! The host store surface the facade is written against: quota request,
//! root acquisition, paginated child enumeration, get/create/remove by
//! path, byte-range reads and seek-to-end writes. A provider instance is
//! constructed once per session and injected into the facade; the facade
//! never reaches for ambient host objects.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::StorageError;

/// Default persistent-storage allocation request: 30 MiB.
pub const DEFAULT_QUOTA_BYTES: u64 = 30 * 1024 * 1024;

/// Lightweight enumeration record; metadata comes from a separate fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub path: String,
    pub name: String,
    pub is_directory: bool,
}

/// Metadata attached to a file by the host store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<SystemTime>,
}

/// File-resolution flags, mirroring the host's get-or-create semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenOptions {
    /// Create the file if absent.
    pub create: bool,
    /// Fail with a collision error if the file already exists.
    /// Only meaningful together with `create`.
    pub exclusive: bool,
}

impl OpenOptions {
    pub fn read() -> Self {
        OpenOptions::default()
    }

    pub fn write(exclusive: bool) -> Self {
        OpenOptions {
            create: true,
            exclusive,
        }
    }
}

/// Session-scoped entry point to the host store.
#[async_trait]
pub trait StoreProvider: Send + Sync {
    /// Request a persistent-storage allocation; returns granted bytes.
    async fn request_quota(&self, bytes: u64) -> Result<u64, StorageError>;

    /// Acquire the sandboxed store root.
    async fn root(&self) -> Result<Arc<dyn StoreRoot>, StorageError>;
}

/// The sandboxed directory root granted by the host.
#[async_trait]
pub trait StoreRoot: Send + Sync {
    /// Resolve a file by path, creating it per `options`.
    async fn get_file(
        &self,
        path: &str,
        options: OpenOptions,
    ) -> Result<Arc<dyn StoreFile>, StorageError>;

    /// Delete a file by path; not-found if absent.
    async fn remove_file(&self, path: &str) -> Result<(), StorageError>;

    /// Begin a paginated enumeration of a directory's children.
    async fn read_dir(&self, path: &str) -> Result<Box<dyn DirReader>, StorageError>;
}

/// Paginated directory reader; an empty batch signals completion.
#[async_trait]
pub trait DirReader: Send {
    async fn next_batch(&mut self) -> Result<Vec<EntryRecord>, StorageError>;
}

/// A resolved file handle supporting sliced reads and seek-aware writes.
#[async_trait]
pub trait StoreFile: Send + Sync {
    async fn metadata(&self) -> Result<FileMetadata, StorageError>;

    /// Read the byte range `[start, end)`, clamped to the file length.
    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, StorageError>;

    /// Write the payload, truncating by default; with `append` the write
    /// cursor seeks to the current end-of-file first. Returns bytes written.
    async fn write(&self, payload: &[u8], append: bool) -> Result<u64, StorageError>;
}
