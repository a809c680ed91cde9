//! Single-flight cache for async fetches.
//!
//! Concurrent calls that resolve to the same cache key share one execution of the
//! wrapped fetch and one outcome. The outcome, success or failure, stays cached
//! until its TTL expires; a failed fetch is *not* retried inside the TTL window.
//!
//! The only locked section is the registration of the placeholder promise:
//!
//! 1. take the registration lock
//! 2. look up the key, or insert a fresh `Unset` promise
//! 3. release the lock
//! 4. attach the fetch to the new promise (creator only)
//! 5. wait on the promise
//!
//! Releasing the lock before step 2 completes would let two callers both miss and
//! both fetch; holding it past step 3 would serialize every cached operation.

use futures::future::BoxFuture;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{cache::promise::Promise, error::cache::CacheError};

/// Registration lock shared by every cache instance in the process.
static REGISTRATION_LOCK: Mutex<()> = Mutex::const_new(());

type FetchFn<A, T, E> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
type KeyFn<A> = Arc<dyn Fn(&A) -> String + Send + Sync>;

struct Entry<T, E> {
    promise: Arc<Promise<T, E>>,
    expires_at: Instant,
}

/// An async fetch wrapped so that identical concurrent calls run it only once.
///
/// `A` is the argument type (a tuple for several positional arguments), `T` the
/// success value handed to every caller, `E` the fetch error shared through an
/// `Arc`.
pub struct SingleFlightCache<A, T, E> {
    name: &'static str,
    ttl: Duration,
    fetch: FetchFn<A, T, E>,
    key_fn: Option<KeyFn<A>>,
    entries: Mutex<HashMap<String, Entry<T, E>>>,
}

impl<A, T, E> SingleFlightCache<A, T, E>
where
    A: Serialize + Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: From<CacheError> + Send + Sync + 'static,
{
    /// Wraps `fetch` in a single-flight cache.
    ///
    /// # Arguments
    /// - `name` - Identity of the wrapped operation, used as the key prefix
    /// - `ttl` - How long a promise (pending, resolved or rejected) stays cached
    /// - `fetch` - The operation to deduplicate
    pub fn new<F, Fut>(name: &'static str, ttl: Duration, fetch: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let fetch: FetchFn<A, T, E> = Arc::new(move |args| Box::pin(fetch(args)));
        Self {
            name,
            ttl,
            fetch,
            key_fn: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the default JSON key with a custom canonicalization of the arguments.
    pub fn with_key<K>(mut self, key_fn: K) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        self.key_fn = Some(Arc::new(key_fn));
        self
    }

    /// Calls the wrapped fetch, sharing any live promise for the same key.
    ///
    /// # Returns
    /// - `Ok(T)` - Value of the (possibly shared) fetch
    /// - `Err(Arc<E>)` - Error of the (possibly shared) fetch, the same instance for
    ///   every caller of that promise
    pub async fn call(&self, args: A) -> Result<T, Arc<E>> {
        let key = self.cache_key(&args).map_err(|err| Arc::new(E::from(err)))?;

        let (promise, created) = {
            let _registration = REGISTRATION_LOCK.lock().await;
            let mut entries = self.entries.lock().await;

            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);

            match entries.get(&key) {
                Some(entry) => (Arc::clone(&entry.promise), false),
                None => {
                    let promise = Arc::new(Promise::new());
                    entries.insert(
                        key,
                        Entry {
                            promise: Arc::clone(&promise),
                            expires_at: now + self.ttl,
                        },
                    );
                    (promise, true)
                }
            }
        };

        if created {
            tracing::debug!("{}: cache miss, starting fetch", self.name);
            promise.attach((self.fetch)(args));
        }

        promise.wait().await
    }

    /// Number of live (unexpired) entries.
    #[cfg(test)]
    pub async fn live_entries(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    fn cache_key(&self, args: &A) -> Result<String, CacheError> {
        if let Some(key_fn) = &self.key_fn {
            return Ok(format!("{}:{}", self.name, key_fn(args)));
        }

        let args = serde_json::to_string(args).map_err(|source| CacheError::Key {
            name: self.name,
            source,
        })?;
        Ok(format!("{}:{}", self.name, args))
    }
}
