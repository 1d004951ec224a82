//! Dual-mode dispatch
//!
//! The single bridge between the two invocation styles. Every facade
//! operation funnels its outcome through one `OpChannel`: the channel
//! settles the chain handed back to the caller and, when a completion
//! callback was supplied, drives it with the identical result. Implemented
//! once here; no operation duplicates this logic.

use crate::chain::Chain;
use crate::error::StorageError;

/// Caller-supplied completion callback.
pub type Completion<T> = Box<dyn FnOnce(Result<T, StorageError>) + Send>;

/// Internal result channel shared by all facade operations.
pub(crate) struct OpChannel<T> {
    chain: Chain<T>,
    callback: Option<Completion<T>>,
}

impl<T: Clone + Send + 'static> OpChannel<T> {
    pub fn new(callback: Option<Completion<T>>) -> Self {
        OpChannel {
            chain: Chain::new(),
            callback,
        }
    }

    /// Handle for the caller; settled by `complete`.
    pub fn chain(&self) -> Chain<T> {
        self.chain.clone()
    }

    /// Deliver the outcome down both paths. The callback fires before the
    /// chain's subscribers, matching direct-callback invocation order.
    pub fn complete(mut self, result: Result<T, StorageError>) {
        if let Some(callback) = self.callback.take() {
            callback(result.clone());
        }
        self.chain.settle(result);
    }
}
