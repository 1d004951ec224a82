//! Quota management
//!
//! Fire-and-forget persistent-storage allocation requests. The request
//! runs detached from every operation chain; the outcome is only logged.

use std::sync::Arc;

use log::info;

use crate::error::report_error;
use crate::provider::{DEFAULT_QUOTA_BYTES, StoreProvider};

pub struct QuotaManager {
    provider: Arc<dyn StoreProvider>,
}

impl QuotaManager {
    pub fn new(provider: Arc<dyn StoreProvider>) -> Self {
        QuotaManager { provider }
    }

    /// Request a persistent allocation (default 30 MiB). Never awaited by
    /// callers; granted bytes or the failure are logged when the host
    /// answers.
    pub fn request_quota(&self, size: Option<u64>) {
        let provider = Arc::clone(&self.provider);
        let bytes = size.unwrap_or(DEFAULT_QUOTA_BYTES);
        tokio::spawn(async move {
            match provider.request_quota(bytes).await {
                Ok(granted) => info!("granted bytes = {}", granted),
                Err(err) => report_error("quota request", &err),
            }
        });
    }
}
