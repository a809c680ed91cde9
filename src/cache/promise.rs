//! Awaitable result cell shared by every caller of a single-flight fetch.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::cache::CacheError;

/// Lifecycle of a [`Promise`].
#[derive(Debug)]
pub enum PromiseState<T, E> {
    /// Registered in the cache but no fetch attached yet.
    Unset,
    /// Fetch attached and running.
    Pending,
    Resolved(T),
    Rejected(Arc<E>),
}

impl<T, E> PromiseState<T, E> {
    fn is_settled(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Rejected(_))
    }
}

/// A result that can be awaited any number of times, by any number of tasks.
///
/// Waiting on a promise that is still `Unset` blocks until a fetch is attached and
/// settles. The promise settles exactly once; every waiter receives a clone of the
/// value or the same `Arc` of the error.
pub struct Promise<T, E> {
    state: watch::Sender<PromiseState<T, E>>,
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: From<CacheError> + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (state, _) = watch::channel(PromiseState::Unset);
        Self { state }
    }

    /// Attaches the fetch and moves the promise to `Pending`.
    ///
    /// The fetch is spawned rather than driven by the first waiter so that it runs
    /// to completion even if that waiter goes away. A fetch that panics settles the
    /// promise as rejected.
    pub fn attach<F>(self: &Arc<Self>, fetch: F)
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.state.send_replace(PromiseState::Pending);

        let promise = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = match tokio::spawn(fetch).await {
                Ok(outcome) => outcome,
                Err(join_err) => Err(E::from(CacheError::FetchAborted(join_err))),
            };
            promise.settle(outcome);
        });
    }

    fn settle(&self, outcome: Result<T, E>) {
        let state = match outcome {
            Ok(value) => PromiseState::Resolved(value),
            Err(err) => PromiseState::Rejected(Arc::new(err)),
        };
        self.state.send_replace(state);
    }

    /// Waits until the promise settles and returns its outcome.
    pub async fn wait(&self) -> Result<T, Arc<E>> {
        let mut rx = self.state.subscribe();

        let Ok(state) = rx.wait_for(PromiseState::is_settled).await else {
            return Err(Arc::new(E::from(CacheError::Abandoned)));
        };

        match &*state {
            PromiseState::Resolved(value) => Ok(value.clone()),
            PromiseState::Rejected(err) => Err(Arc::clone(err)),
            PromiseState::Unset | PromiseState::Pending => {
                Err(Arc::new(E::from(CacheError::Abandoned)))
            }
        }
    }

    /// Whether a fetch has been attached (the promise left `Unset`).
    #[cfg(test)]
    pub fn is_attached(&self) -> bool {
        !matches!(*self.state.borrow(), PromiseState::Unset)
    }

    /// Whether the promise is resolved or rejected.
    #[cfg(test)]
    pub fn is_settled(&self) -> bool {
        self.state.borrow().is_settled()
    }
}

impl<T, E> Default for Promise<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: From<CacheError> + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
