//! Fixed-wait retry for flaky outbound requests.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::AppError;

/// When to give up retrying.
///
/// Retrying stops at whichever limit is hit first: `max_attempts` attempts,
/// or a failure observed once `max_elapsed` has passed since the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub wait: Duration,
    pub max_attempts: u32,
    pub max_elapsed: Duration,
}

impl RetryPolicy {
    pub const fn new(wait: Duration, max_attempts: u32, max_elapsed: Duration) -> Self {
        Self {
            wait,
            max_attempts,
            max_elapsed,
        }
    }
}

/// Calls `op` until it succeeds, a limit of `policy` is hit, or it fails with
/// an error that `is_retryable` rejects.
///
/// # Arguments
/// - `label` - Name of the operation, used in logs
/// - `policy` - Wait between attempts and stop conditions
/// - `is_retryable` - Whether a failure may be retried
/// - `op` - Produces one attempt
///
/// # Returns
/// - `Ok(T)` - Value of the first successful attempt
/// - `Err(AppError)` - Error of the last attempt
pub async fn retry<T, F, Fut, P>(
    label: &str,
    policy: RetryPolicy,
    is_retryable: P,
    mut op: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
    P: Fn(&AppError) -> bool,
{
    let started = Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retryable(&err)
            || attempt >= policy.max_attempts
            || started.elapsed() >= policy.max_elapsed
        {
            return Err(err);
        }

        tracing::warn!(
            "{} failed (attempt {}/{}), retrying in {:?}: {}",
            label,
            attempt,
            policy.max_attempts,
            policy.wait,
            err
        );
        tokio::time::sleep(policy.wait).await;
    }
}
