//! sandfs demo - Entry Point
//!
//! Exercises the storage facade in both invocation styles against the
//! local sandbox provider.

use std::sync::Arc;

use log::{error, info};

use sandfs::error::report_error;
use sandfs::{
    ChunkedReader, DirectoryAggregator, QuotaManager, ReadOptions, SandboxProvider, StorageFacade,
    StoreConfig,
};

#[tokio::main]
async fn main() {
    // env_logger picks up the RUST_LOG environment variable
    env_logger::init();

    info!("Launching sandbox store demo...");

    let config = match StoreConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    let provider = Arc::new(SandboxProvider::from_config(&config));
    let facade = StorageFacade::new(provider.clone());

    // Detached: the grant is logged whenever the provider answers.
    QuotaManager::new(provider).request_quota(Some(config.quota_bytes));

    // Callback style
    let write = facade.write_file(
        "note.txt",
        "hello",
        Some(Box::new(|result| match result {
            Ok(receipt) => info!("note.txt holds {} bytes", receipt.bytes_written),
            Err(err) => report_error("write note.txt", &err),
        })),
    );
    let _ = write.await;

    // Chain style: append, then re-read the combined content
    let reader = facade.clone();
    let read = facade
        .append_file("note.txt", "world", None)
        .pipe(move |_| reader.read_file("note.txt", ReadOptions::default(), None));
    read.display();
    let _ = read.await;

    let chunks = ChunkedReader::with_window(&facade, config.chunk_size)
        .read_buffer(
            "note.txt",
            ReadOptions {
                size: Some(4),
                ..ReadOptions::default()
            },
            None,
        )
        .await;
    match chunks {
        Ok(chunks) => info!("note.txt buffered as {:?}", chunks),
        Err(err) => report_error("read_buffer note.txt", &err),
    }

    let listing = DirectoryAggregator::new(&facade).list_files("/", None);
    listing.display();
    let _ = listing.await;
}
