use thiserror::Error;

/// Failures originating in the single-flight cache itself rather than in the
/// wrapped fetch.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The call arguments could not be serialized into a cache key.
    #[error("Failed to build cache key for {name}: {source}")]
    Key {
        /// Name of the cached operation
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The fetch task panicked or was cancelled before producing a result.
    #[error("Cached fetch aborted before completing: {0}")]
    FetchAborted(#[from] tokio::task::JoinError),

    /// The promise was dropped without ever being settled.
    #[error("Cached promise was abandoned before it settled")]
    Abandoned,
}
