//! Chunked reading
//!
//! Bounded-window reads for large files, built on the facade's open
//! primitive. The file is consumed in successive byte ranges and each
//! window is decoded independently; the caller receives the ordered
//! sequence of decoded chunks rather than one concatenated string.

use log::info;

use crate::chain::Chain;
use crate::facade::dispatch::Completion;
use crate::facade::operations::StorageFacade;
use crate::facade::options::ReadOptions;
use crate::provider::OpenOptions;

pub struct ChunkedReader {
    facade: StorageFacade,
    default_window: Option<u64>,
}

impl ChunkedReader {
    pub fn new(facade: &StorageFacade) -> Self {
        ChunkedReader {
            facade: facade.clone(),
            default_window: None,
        }
    }

    /// Reader whose window falls back to the configured chunk size when a
    /// call does not select one.
    pub fn with_window(facade: &StorageFacade, window: u64) -> Self {
        ChunkedReader {
            facade: facade.clone(),
            default_window: Some(window).filter(|w| *w > 0),
        }
    }

    /// Read `[start, start+size)` windows until the end of the file.
    ///
    /// The window is `options.size`, else the reader's default, else the
    /// whole file size, so small files resolve in a single iteration and
    /// an empty file resolves immediately with no chunks.
    pub fn read_buffer(
        &self,
        filename: &str,
        options: ReadOptions,
        completion: Option<Completion<Vec<String>>>,
    ) -> Chain<Vec<String>> {
        let filename = filename.to_string();
        let default_window = self.default_window;
        self.facade.open(
            move |root| async move {
                let file = root.get_file(&filename, OpenOptions::read()).await?;
                let total = file.metadata().await?.size;
                let window = options
                    .size
                    .filter(|size| *size > 0)
                    .or(default_window)
                    .unwrap_or(total);
                let mut start = options.start.unwrap_or(0);
                let mut chunks = Vec::new();
                while start < total {
                    let end = start.saturating_add(window).min(total);
                    let bytes = file.read_range(start, end).await?;
                    chunks.push(decode_chunk(&bytes));
                    start = end;
                }
                info!(
                    "Buffered {} in {} chunk(s) of up to {} bytes",
                    filename,
                    chunks.len(),
                    window
                );
                Ok(chunks)
            },
            completion,
        )
    }
}

/// 8-bit-clean decode: each byte maps to the char with the same scalar
/// value (Latin-1 mapping, not multi-byte UTF-8).
fn decode_chunk(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
