//! Deferred value chain
//!
//! A subscribable deferred value that settles exactly once, bridging the
//! two invocation styles every storage operation supports: an explicit
//! completion callback, or an awaitable chain with sequential composition.
//!
//! Continuations attached to the same chain fire in attachment order.
//! There is no cancellation: dropping a chain never stops the operation
//! that will eventually settle it.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use log::{error, info};

use crate::error::StorageError;

/// Continuation invoked with the settled outcome.
pub type Subscriber<T> = Box<dyn FnOnce(Result<T, StorageError>) + Send>;

enum ChainState<T> {
    Pending,
    Settled(Result<T, StorageError>),
}

struct Inner<T> {
    state: ChainState<T>,
    subscribers: Vec<Subscriber<T>>,
    wakers: Vec<Waker>,
}

/// A deferred value, resolved or rejected exactly once.
///
/// Cloning yields another handle to the same settlement; awaiting any
/// handle yields the same `Result`.
pub struct Chain<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Chain {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Return shape of a `pipe` continuation: either an immediate value
/// (`Step::Done`) or a further deferred chain the outer chain must wait
/// on. Returning a `Chain` directly converts into the deferred step.
pub enum Step<U> {
    Done(U),
    Wait(Chain<U>),
}

impl<U> From<Chain<U>> for Step<U> {
    fn from(chain: Chain<U>) -> Self {
        Step::Wait(chain)
    }
}

impl<T: Clone + Send + 'static> Chain<T> {
    pub fn new() -> Self {
        Chain {
            inner: Arc::new(Mutex::new(Inner {
                state: ChainState::Pending,
                subscribers: Vec::new(),
                wakers: Vec::new(),
            })),
        }
    }

    /// Settle with a success value. No-op if already settled.
    pub fn resolve(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Settle with a failure. No-op if already settled.
    pub fn reject(&self, error: StorageError) {
        self.settle(Err(error));
    }

    /// Settle with the given outcome, firing subscribers in attachment
    /// order. Later settlement attempts are ignored.
    pub fn settle(&self, result: Result<T, StorageError>) {
        let (subscribers, wakers) = {
            let mut inner = self.inner.lock().unwrap();
            if let ChainState::Settled(_) = inner.state {
                return;
            }
            inner.state = ChainState::Settled(result.clone());
            (
                std::mem::take(&mut inner.subscribers),
                std::mem::take(&mut inner.wakers),
            )
        };
        // Subscribers run outside the lock so they may attach to this chain.
        for subscriber in subscribers {
            subscriber(result.clone());
        }
        for waker in wakers {
            waker.wake();
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.inner.lock().unwrap().state, ChainState::Settled(_))
    }

    /// Attach a raw continuation. Fires immediately if already settled.
    pub fn subscribe(&self, subscriber: Subscriber<T>) {
        let mut inner = self.inner.lock().unwrap();
        let settled = match &inner.state {
            ChainState::Pending => None,
            ChainState::Settled(result) => Some(result.clone()),
        };
        match settled {
            None => inner.subscribers.push(subscriber),
            Some(result) => {
                drop(inner);
                subscriber(result);
            }
        }
    }

    /// Map the success value into a new chain; rejection propagates.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Chain<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let next = Chain::new();
        let out = next.clone();
        self.subscribe(Box::new(move |result| match result {
            Ok(value) => next.resolve(on_fulfilled(value)),
            Err(error) => next.reject(error),
        }));
        out
    }

    /// Observe a rejection without consuming it; settlement propagates
    /// unchanged either way.
    pub fn on_error<F>(&self, observer: F) -> Chain<T>
    where
        F: FnOnce(&StorageError) + Send + 'static,
    {
        let next = Chain::new();
        let out = next.clone();
        self.subscribe(Box::new(move |result| {
            if let Err(error) = &result {
                observer(error);
            }
            next.settle(result);
        }));
        out
    }

    /// Sequential composition. A continuation returning a `Chain` (or
    /// `Step::Wait`) suspends the returned chain until that inner chain
    /// settles (one-level flattening); `Step::Done` settles it immediately.
    pub fn pipe<U, S, F>(&self, on_fulfilled: F) -> Chain<U>
    where
        U: Clone + Send + 'static,
        S: Into<Step<U>>,
        F: FnOnce(T) -> S + Send + 'static,
    {
        let next = Chain::new();
        let out = next.clone();
        self.subscribe(Box::new(move |result| match result {
            Ok(value) => match on_fulfilled(value).into() {
                Step::Done(done) => next.resolve(done),
                Step::Wait(inner) => {
                    inner.subscribe(Box::new(move |inner_result| next.settle(inner_result)));
                }
            },
            Err(error) => next.reject(error),
        }));
        out
    }

    /// Run `handler` on both settlement paths and resolve the returned
    /// chain with its output. The success/failure distinction is collapsed
    /// in the returned chain; the handler still sees which path fired.
    pub fn ensure<U, F>(&self, handler: F) -> Chain<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(Result<T, StorageError>) -> U + Send + 'static,
    {
        let next = Chain::new();
        let out = next.clone();
        self.subscribe(Box::new(move |result| next.resolve(handler(result))));
        out
    }
}

impl<T: Clone + Debug + Send + 'static> Chain<T> {
    /// Terminal debug consumer: logs the settled outcome.
    pub fn display(&self) {
        self.subscribe(Box::new(|result| match result {
            Ok(value) => info!("{:?}", value),
            Err(err) => error!("chain rejected ({}): {}", err.kind(), err),
        }));
    }
}

impl<T: Clone + Send + 'static> Default for Chain<T> {
    fn default() -> Self {
        Chain::new()
    }
}

impl<T: Clone + Send + 'static> Future for Chain<T> {
    type Output = Result<T, StorageError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut inner = self.inner.lock().unwrap();
        match &inner.state {
            ChainState::Settled(result) => Poll::Ready(result.clone()),
            ChainState::Pending => {
                if !inner.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    inner.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_settles_at_most_once() {
        let chain: Chain<u32> = Chain::new();
        chain.resolve(1);
        chain.resolve(2);
        chain.reject(StorageError::Unknown("late".into()));

        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        chain.subscribe(Box::new(move |r| {
            *sink.lock().unwrap() = Some(r);
        }));
        assert_eq!(*seen.lock().unwrap(), Some(Ok(1)));
    }

    #[test]
    fn test_subscribers_fire_in_attachment_order() {
        let chain: Chain<&'static str> = Chain::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            chain.subscribe(Box::new(move |_| order.lock().unwrap().push(i)));
        }
        chain.resolve("go");
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_then_maps_success_and_propagates_rejection() {
        let chain: Chain<u32> = Chain::new();
        let mapped = chain.then(|n| n * 2);
        chain.resolve(21);
        let result = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&result);
        mapped.subscribe(Box::new(move |r| *sink.lock().unwrap() = Some(r)));
        assert_eq!(*result.lock().unwrap(), Some(Ok(42)));

        let failing: Chain<u32> = Chain::new();
        let mapped = failing.then(|n| n * 2);
        failing.reject(StorageError::NotFound("f".into()));
        let result = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&result);
        mapped.subscribe(Box::new(move |r| *sink.lock().unwrap() = Some(r)));
        assert_eq!(
            *result.lock().unwrap(),
            Some(Err(StorageError::NotFound("f".into())))
        );
    }

    #[test]
    fn test_pipe_flattens_deferred_step() {
        let outer: Chain<u32> = Chain::new();
        let inner: Chain<u32> = Chain::new();
        let inner_handle = inner.clone();
        let piped = outer.pipe(move |n| {
            inner_handle.resolve(n + 1);
            inner
        });
        outer.resolve(1);
        assert!(piped.is_settled());

        let result = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&result);
        piped.subscribe(Box::new(move |r| *sink.lock().unwrap() = Some(r)));
        assert_eq!(*result.lock().unwrap(), Some(Ok(2)));
    }

    #[test]
    fn test_pipe_waits_for_pending_inner_chain() {
        let outer: Chain<u32> = Chain::new();
        let inner: Chain<u32> = Chain::new();
        let inner_handle = inner.clone();
        let piped = outer.pipe(move |_| inner_handle);
        outer.resolve(1);
        assert!(!piped.is_settled());
        inner.resolve(7);
        assert!(piped.is_settled());
    }

    #[test]
    fn test_pipe_accepts_immediate_value() {
        let chain: Chain<u32> = Chain::new();
        let piped = chain.pipe(|n| Step::Done(n + 1));
        chain.resolve(9);
        let result = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&result);
        piped.subscribe(Box::new(move |r| *sink.lock().unwrap() = Some(r)));
        assert_eq!(*result.lock().unwrap(), Some(Ok(10)));
    }

    #[test]
    fn test_ensure_runs_on_both_paths() {
        let calls = Arc::new(AtomicUsize::new(0));

        let ok: Chain<u32> = Chain::new();
        let counter = Arc::clone(&calls);
        let after = ok.ensure(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            "done"
        });
        ok.resolve(1);
        assert!(after.is_settled());

        let err: Chain<u32> = Chain::new();
        let counter = Arc::clone(&calls);
        let after = err.ensure(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            "done"
        });
        err.reject(StorageError::Unknown("x".into()));
        // ensure collapses the failure into a resolution
        let result = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&result);
        after.subscribe(Box::new(move |r| *sink.lock().unwrap() = Some(r)));
        assert_eq!(*result.lock().unwrap(), Some(Ok("done")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_on_error_observes_without_consuming() {
        let chain: Chain<u32> = Chain::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let after = chain.on_error(move |e| *sink.lock().unwrap() = Some(e.kind()));
        chain.reject(StorageError::PermissionDenied("p".into()));

        assert_eq!(*seen.lock().unwrap(), Some("permission-denied"));
        let result = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&result);
        after.subscribe(Box::new(move |r| *sink.lock().unwrap() = Some(r)));
        assert_eq!(
            *result.lock().unwrap(),
            Some(Err(StorageError::PermissionDenied("p".into())))
        );
    }

    #[tokio::test]
    async fn test_chain_is_awaitable() {
        let chain: Chain<u32> = Chain::new();
        let settler = chain.clone();
        tokio::spawn(async move {
            settler.resolve(5);
        });
        assert_eq!(chain.await, Ok(5));
    }

    #[tokio::test]
    async fn test_await_after_settlement() {
        let chain: Chain<u32> = Chain::new();
        chain.reject(StorageError::InvalidState("s".into()));
        assert_eq!(chain.await, Err(StorageError::InvalidState("s".into())));
    }
}
