//! Directory listing
//!
//! Paginated enumeration plus per-entry metadata enrichment. Lightweight
//! descriptors are built synchronously from the enumeration records; the
//! metadata fetches for file entries are issued concurrently and the
//! listing resolves only once every fetch has completed or failed. A
//! single failed fetch marks that entry's metadata unavailable instead of
//! stalling the aggregate.

use std::sync::Arc;
use std::time::SystemTime;

use futures::future::join_all;
use log::{info, warn};

use crate::chain::Chain;
use crate::error::StorageError;
use crate::facade::dispatch::Completion;
use crate::facade::operations::StorageFacade;
use crate::provider::{EntryRecord, FileMetadata, OpenOptions, StoreRoot};

/// Directory entry enriched with lazily-fetched metadata.
///
/// Enumeration populates `path`/`name`/`is_directory`; the remaining
/// fields stay `None` for directories and for entries whose metadata
/// fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: String,
    pub name: String,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub content_type: Option<String>,
    pub last_modified: Option<SystemTime>,
}

impl FileHandle {
    fn from_entry(entry: &EntryRecord) -> Self {
        FileHandle {
            path: entry.path.clone(),
            name: entry.name.clone(),
            is_directory: entry.is_directory,
            size: None,
            content_type: None,
            last_modified: None,
        }
    }
}

pub struct DirectoryAggregator {
    facade: StorageFacade,
}

impl DirectoryAggregator {
    pub fn new(facade: &StorageFacade) -> Self {
        DirectoryAggregator {
            facade: facade.clone(),
        }
    }

    /// List a directory's entries with attached metadata, sorted by entry
    /// name and reversed. Enumeration failure rejects the whole listing;
    /// individual metadata failures degrade that entry only.
    pub fn list_files(
        &self,
        dirname: &str,
        completion: Option<Completion<Vec<FileHandle>>>,
    ) -> Chain<Vec<FileHandle>> {
        let dirname = dirname.to_string();
        self.facade.open(
            move |root| async move {
                let mut reader = root.read_dir(&dirname).await?;
                let mut entries: Vec<EntryRecord> = Vec::new();
                loop {
                    let batch = reader.next_batch().await?;
                    if batch.is_empty() {
                        break;
                    }
                    entries.extend(batch);
                }

                // host default key, then reversed
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                entries.reverse();

                let fetches = entries.into_iter().map(|entry| {
                    let root = Arc::clone(&root);
                    async move {
                        let mut handle = FileHandle::from_entry(&entry);
                        if !entry.is_directory {
                            match fetch_metadata(root, &entry.path).await {
                                Ok(meta) => {
                                    handle.size = Some(meta.size);
                                    handle.content_type = meta.content_type;
                                    handle.last_modified = meta.last_modified;
                                }
                                Err(err) => {
                                    warn!("Metadata unavailable for {}: {}", entry.path, err);
                                }
                            }
                        }
                        handle
                    }
                });
                let listed = join_all(fetches).await;
                info!("Listed {} entries in {}", listed.len(), dirname);
                Ok(listed)
            },
            completion,
        )
    }
}

async fn fetch_metadata(
    root: Arc<dyn StoreRoot>,
    path: &str,
) -> Result<FileMetadata, StorageError> {
    let file = root.get_file(path, OpenOptions::read()).await?;
    file.metadata().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::provider::{DirReader, StoreFile, StoreProvider};

    // Stub store where one file's metadata fetch always rejects.
    struct FlakyProvider;
    struct FlakyRoot;
    struct FlakyDir {
        served: bool,
    }
    struct FlakyFile {
        path: String,
    }

    #[async_trait]
    impl StoreProvider for FlakyProvider {
        async fn request_quota(&self, bytes: u64) -> Result<u64, StorageError> {
            Ok(bytes)
        }

        async fn root(&self) -> Result<Arc<dyn StoreRoot>, StorageError> {
            Ok(Arc::new(FlakyRoot))
        }
    }

    #[async_trait]
    impl StoreRoot for FlakyRoot {
        async fn get_file(
            &self,
            path: &str,
            _options: OpenOptions,
        ) -> Result<Arc<dyn StoreFile>, StorageError> {
            Ok(Arc::new(FlakyFile {
                path: path.to_string(),
            }))
        }

        async fn remove_file(&self, _path: &str) -> Result<(), StorageError> {
            Ok(())
        }

        async fn read_dir(&self, _path: &str) -> Result<Box<dyn DirReader>, StorageError> {
            Ok(Box::new(FlakyDir { served: false }))
        }
    }

    #[async_trait]
    impl DirReader for FlakyDir {
        async fn next_batch(&mut self) -> Result<Vec<EntryRecord>, StorageError> {
            if self.served {
                return Ok(Vec::new());
            }
            self.served = true;
            Ok(vec![
                EntryRecord {
                    path: "/good.txt".to_string(),
                    name: "good.txt".to_string(),
                    is_directory: false,
                },
                EntryRecord {
                    path: "/bad.txt".to_string(),
                    name: "bad.txt".to_string(),
                    is_directory: false,
                },
            ])
        }
    }

    #[async_trait]
    impl StoreFile for FlakyFile {
        async fn metadata(&self) -> Result<FileMetadata, StorageError> {
            if self.path.contains("bad") {
                Err(StorageError::InvalidState(self.path.clone()))
            } else {
                Ok(FileMetadata {
                    size: 3,
                    content_type: Some("text/plain".to_string()),
                    last_modified: None,
                })
            }
        }

        async fn read_range(&self, _start: u64, _end: u64) -> Result<Vec<u8>, StorageError> {
            Ok(Vec::new())
        }

        async fn write(&self, payload: &[u8], _append: bool) -> Result<u64, StorageError> {
            Ok(payload.len() as u64)
        }
    }

    #[tokio::test]
    async fn test_failed_metadata_fetch_degrades_entry_without_stalling() {
        let facade = StorageFacade::new(Arc::new(FlakyProvider));
        let listing = DirectoryAggregator::new(&facade)
            .list_files("/", None)
            .await
            .unwrap();

        // the listing still resolves with every enumerated entry
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "good.txt");
        assert_eq!(listing[1].name, "bad.txt");

        assert_eq!(listing[0].size, Some(3));
        assert_eq!(listing[0].content_type.as_deref(), Some("text/plain"));

        // the failed fetch leaves that entry's metadata unavailable
        let degraded = &listing[1];
        assert_eq!(degraded.size, None);
        assert_eq!(degraded.content_type, None);
        assert_eq!(degraded.last_modified, None);
    }
}
