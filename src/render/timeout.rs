//! Timeout utilities for page operations

use std::future::Future;
use std::time::Duration;

use crate::errors::FetchError;

/// Wrap a page operation with an explicit timeout.
///
/// A timeout becomes [`FetchError::Timeout`] naming the operation; the
/// operation's own errors pass through unchanged.
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    url: &str,
    operation_name: &str,
) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout {
            url: url.to_string(),
            operation: operation_name.to_string(),
            timeout,
        }),
    }
}
