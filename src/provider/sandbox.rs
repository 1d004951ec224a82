//! Sandbox provider
//!
//! Local adapter implementing the host-store surface over `tokio::fs`.
//! All paths are virtual and resolved beneath a single root directory;
//! a quota ledger bounds the total bytes the sandbox may hold.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::{debug, info};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::provider::traits::{
    DirReader, EntryRecord, FileMetadata, OpenOptions, StoreFile, StoreProvider, StoreRoot,
};
use crate::provider::validation::{join_virtual, resolve_virtual_dir, resolve_virtual_path};

/// Quota-bounded sandbox over a local directory.
pub struct SandboxProvider {
    root_dir: PathBuf,
    page_size: usize,
    granted: Arc<AtomicU64>,
}

impl SandboxProvider {
    pub fn new(root_dir: impl Into<PathBuf>, quota_bytes: u64, page_size: usize) -> Self {
        SandboxProvider {
            root_dir: root_dir.into(),
            page_size: page_size.max(1),
            granted: Arc::new(AtomicU64::new(quota_bytes)),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        SandboxProvider::new(&config.root_dir, config.quota_bytes, config.page_size)
    }
}

#[async_trait]
impl StoreProvider for SandboxProvider {
    async fn request_quota(&self, bytes: u64) -> Result<u64, StorageError> {
        self.granted.store(bytes, Ordering::SeqCst);
        debug!("sandbox quota set to {} bytes", bytes);
        Ok(bytes)
    }

    async fn root(&self) -> Result<Arc<dyn StoreRoot>, StorageError> {
        fs::create_dir_all(&self.root_dir).await?;
        Ok(Arc::new(SandboxRoot {
            root_dir: self.root_dir.clone(),
            page_size: self.page_size,
            granted: Arc::clone(&self.granted),
        }))
    }
}

struct SandboxRoot {
    root_dir: PathBuf,
    page_size: usize,
    granted: Arc<AtomicU64>,
}

#[async_trait]
impl StoreRoot for SandboxRoot {
    async fn get_file(
        &self,
        path: &str,
        options: OpenOptions,
    ) -> Result<Arc<dyn StoreFile>, StorageError> {
        let real_path = resolve_virtual_path(&self.root_dir, path)?;

        if options.create {
            if let Some(parent) = real_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            // create_new carries the exclusivity contract: an existing
            // target surfaces as AlreadyExists, translated to the
            // collision class.
            let open = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .create_new(options.exclusive)
                .open(&real_path)
                .await;
            match open {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    return Err(StorageError::InvalidModification(path.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            let meta = fs::metadata(&real_path)
                .await
                .map_err(|_| StorageError::NotFound(path.to_string()))?;
            if !meta.is_file() {
                return Err(StorageError::InvalidState(format!("not a file: {}", path)));
            }
        }

        Ok(Arc::new(SandboxFile {
            real_path,
            virtual_path: path.to_string(),
            root_dir: self.root_dir.clone(),
            granted: Arc::clone(&self.granted),
        }))
    }

    async fn remove_file(&self, path: &str) -> Result<(), StorageError> {
        let real_path = resolve_virtual_path(&self.root_dir, path)?;
        fs::remove_file(&real_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
                _ => e.into(),
            })?;
        info!("Removed file {}", path);
        Ok(())
    }

    async fn read_dir(&self, path: &str) -> Result<Box<dyn DirReader>, StorageError> {
        let real_path = resolve_virtual_dir(&self.root_dir, path)?;
        let mut reader = fs::read_dir(&real_path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            _ => e.into(),
        })?;

        // Entries are collected up front and served back in pages, the way
        // the host's stateful directory reader batches them.
        let mut entries = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_directory = entry.file_type().await?.is_dir();
            entries.push(EntryRecord {
                path: join_virtual(path, &name),
                name,
                is_directory,
            });
        }

        Ok(Box::new(SandboxDirReader {
            entries,
            cursor: 0,
            page_size: self.page_size,
        }))
    }
}

struct SandboxDirReader {
    entries: Vec<EntryRecord>,
    cursor: usize,
    page_size: usize,
}

#[async_trait]
impl DirReader for SandboxDirReader {
    async fn next_batch(&mut self) -> Result<Vec<EntryRecord>, StorageError> {
        let end = (self.cursor + self.page_size).min(self.entries.len());
        let batch = self.entries[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(batch)
    }
}

struct SandboxFile {
    real_path: PathBuf,
    virtual_path: String,
    root_dir: PathBuf,
    granted: Arc<AtomicU64>,
}

#[async_trait]
impl StoreFile for SandboxFile {
    async fn metadata(&self) -> Result<FileMetadata, StorageError> {
        let meta = fs::metadata(&self.real_path)
            .await
            .map_err(|_| StorageError::NotFound(self.virtual_path.clone()))?;
        Ok(FileMetadata {
            size: meta.len(),
            content_type: guess_content_type(&self.virtual_path),
            last_modified: meta.modified().ok(),
        })
    }

    async fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>, StorageError> {
        let meta = fs::metadata(&self.real_path)
            .await
            .map_err(|_| StorageError::NotFound(self.virtual_path.clone()))?;
        let len = meta.len();
        let start = start.min(len);
        let end = end.min(len);
        if end <= start {
            return Ok(Vec::new());
        }

        let mut file = fs::File::open(&self.real_path).await?;
        file.seek(SeekFrom::Start(start)).await?;
        let mut buffer = vec![0u8; (end - start) as usize];
        file.read_exact(&mut buffer).await?;
        Ok(buffer)
    }

    async fn write(&self, payload: &[u8], append: bool) -> Result<u64, StorageError> {
        let old_len = fs::metadata(&self.real_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        let new_len = if append {
            old_len + payload.len() as u64
        } else {
            payload.len() as u64
        };

        let used = scan_used_bytes(&self.root_dir).await?;
        let projected = used - old_len.min(used) + new_len;
        let granted = self.granted.load(Ordering::SeqCst);
        if projected > granted {
            return Err(StorageError::QuotaExceeded(format!(
                "{}: {} of {} bytes",
                self.virtual_path, projected, granted
            )));
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(!append)
            .open(&self.real_path)
            .await?;
        if append {
            file.seek(SeekFrom::End(0)).await?;
        }
        file.write_all(payload).await?;
        file.flush().await?;
        debug!(
            "Wrote {} bytes to {} (append: {})",
            payload.len(),
            self.virtual_path,
            append
        );
        Ok(payload.len() as u64)
    }
}

/// Total bytes currently held beneath the sandbox root.
async fn scan_used_bytes(root: &Path) -> Result<u64, StorageError> {
    let mut total = 0u64;
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut reader = match fs::read_dir(&dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = reader.next_entry().await? {
            let meta = entry.metadata().await?;
            if meta.is_dir() {
                pending.push(entry.path());
            } else {
                total += meta.len();
            }
        }
    }
    Ok(total)
}

/// Best-effort content-type guess from the file extension, standing in for
/// the type the host blob would carry.
fn guess_content_type(path: &str) -> Option<String> {
    let ext = Path::new(path).extension()?.to_str()?;
    let mime = match ext {
        "txt" | "log" | "md" => "text/plain",
        "json" => "application/json",
        "html" => "text/html",
        "csv" => "text/csv",
        "bin" => "application/octet-stream",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn provider(root: &Path, quota: u64) -> SandboxProvider {
        SandboxProvider::new(root, quota, 2)
    }

    #[tokio::test]
    async fn test_exclusive_create_collides_on_existing_file() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 1024).root().await.unwrap();

        root.get_file("a.txt", OpenOptions::write(true))
            .await
            .unwrap();
        let err = match root.get_file("a.txt", OpenOptions::write(true)).await {
            Err(err) => err,
            Ok(_) => panic!("expected collision on existing file"),
        };
        assert!(err.is_collision());

        // non-exclusive resolution of the same path succeeds
        root.get_file("a.txt", OpenOptions::write(false))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_read_mode_requires_existing_file() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 1024).root().await.unwrap();
        let err = match root.get_file("missing.txt", OpenOptions::read()).await {
            Err(err) => err,
            Ok(_) => panic!("expected missing file to reject"),
        };
        assert_eq!(err.kind(), "not-found");
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 1024).root().await.unwrap();
        let err = match root.get_file("../escape.txt", OpenOptions::write(false)).await {
            Err(err) => err,
            Ok(_) => panic!("expected traversal to reject"),
        };
        assert_eq!(err.kind(), "permission-denied");
    }

    #[tokio::test]
    async fn test_quota_bounds_total_bytes() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 8).root().await.unwrap();

        let file = root
            .get_file("a.txt", OpenOptions::write(false))
            .await
            .unwrap();
        file.write(b"12345678", false).await.unwrap();

        let other = root
            .get_file("b.txt", OpenOptions::write(false))
            .await
            .unwrap();
        let err = other.write(b"x", false).await.unwrap_err();
        assert_eq!(err.kind(), "quota-exceeded");

        // overwriting within the bound still works
        file.write(b"1234", false).await.unwrap();
        other.write(b"x", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_range_is_clamped() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 1024).root().await.unwrap();
        let file = root
            .get_file("a.txt", OpenOptions::write(false))
            .await
            .unwrap();
        file.write(b"hello", false).await.unwrap();

        assert_eq!(file.read_range(0, 100).await.unwrap(), b"hello");
        assert_eq!(file.read_range(2, 4).await.unwrap(), b"ll");
        assert_eq!(file.read_range(5, 9).await.unwrap(), b"");
    }

    #[tokio::test]
    async fn test_append_seeks_to_end() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 1024).root().await.unwrap();
        let file = root
            .get_file("a.txt", OpenOptions::write(false))
            .await
            .unwrap();
        file.write(b"hello", false).await.unwrap();
        file.write(b"world", true).await.unwrap();
        assert_eq!(file.read_range(0, 10).await.unwrap(), b"helloworld");
    }

    #[tokio::test]
    async fn test_pagination_ends_with_empty_batch() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 1024).root().await.unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            root.get_file(name, OpenOptions::write(false)).await.unwrap();
        }

        let mut reader = root.read_dir("/").await.unwrap();
        let mut seen = 0;
        loop {
            let batch = reader.next_batch().await.unwrap();
            if batch.is_empty() {
                break;
            }
            assert!(batch.len() <= 2);
            seen += batch.len();
        }
        assert_eq!(seen, 3);
    }

    #[tokio::test]
    async fn test_metadata_carries_size_and_type() {
        let dir = tempdir().unwrap();
        let root = provider(dir.path(), 1024).root().await.unwrap();
        let file = root
            .get_file("notes.txt", OpenOptions::write(false))
            .await
            .unwrap();
        file.write(b"abc", false).await.unwrap();

        let meta = file.metadata().await.unwrap();
        assert_eq!(meta.size, 3);
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert!(meta.last_modified.is_some());
    }
}
