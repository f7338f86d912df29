//! Linear-backoff retry for text-model calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::LlmError;

/// 3 total attempts, waiting 1s then 2s between them.
pub const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_secs(1);

/// Retry an async operation with linearly increasing backoff.
///
/// Retries only errors [`LlmError::is_retryable`] approves of; validation
/// failures that are guaranteed to recur (missing key) surface immediately.
/// After the final attempt the last error is wrapped in
/// [`LlmError::RetriesExhausted`].
pub async fn retry_linear<T, Fut, F>(mut attempt: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut last_error = None;

    for attempt_no in 1..=MAX_ATTEMPTS {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.is_retryable() {
                    return Err(e);
                }
                warn!("Text-model attempt {attempt_no}/{MAX_ATTEMPTS} failed: {e}");
                last_error = Some(e);
                if attempt_no < MAX_ATTEMPTS {
                    tokio::time::sleep(BACKOFF_STEP * attempt_no).await;
                }
            }
        }
    }

    Err(LlmError::RetriesExhausted(Box::new(
        last_error.expect("last_error is set after failed attempts"),
    )))
}
