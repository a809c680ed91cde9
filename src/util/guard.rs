//! Fault isolation for handler dispatch and scheduled task invocations.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use crate::error::AppError;

/// Runs `fut`, converting a panic into [`AppError::Panicked`].
///
/// Callers decide what to do with the error; dispatch logs and drops it, task
/// invocations apply their error policy.
///
/// # Arguments
/// - `label` - Name of the handler or task, used in the panic error
/// - `fut` - The unit of work to run
pub async fn run_guarded<T, F>(label: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(_) => Err(AppError::Panicked(label.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_results() {
        let ok = run_guarded("ok", async { Ok::<_, AppError>(3) }).await;
        assert_eq!(ok.unwrap(), 3);

        let err = run_guarded("err", async {
            Err::<u8, _>(AppError::InternalError("nope".to_string()))
        })
        .await;
        assert_eq!(err.unwrap_err().to_string(), "nope");
    }

    /// Tests that a panic inside the guarded future becomes an error.
    ///
    /// Expected: AppError::Panicked carrying the label
    #[tokio::test]
    async fn panic_becomes_error() {
        async fn explode() -> Result<(), AppError> {
            panic!("handler bug")
        }

        let err = run_guarded("who", explode()).await.unwrap_err();

        assert!(matches!(err, AppError::Panicked(ref label) if label == "who"));
    }
}
