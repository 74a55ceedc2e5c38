//! Timeout helpers
//!
//! Wrap async operations so an elapsed deadline becomes a typed error
//! instead of a hung task.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let result = with_timeout(
//!     Duration::from_secs(30),
//!     async { /* LLM call */ },
//!     "generate docs for Foo"
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{DocError, LlmError, Result};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DocError::timeout(operation_name, timeout)),
    }
}

/// Bound one generation call; an elapsed timeout is recorded as a
/// per-task failure of the named provider
pub async fn with_task_timeout<F>(
    timeout: Duration,
    future: F,
    operation_name: &str,
    provider: &str,
) -> std::result::Result<String, LlmError>
where
    F: Future<Output = std::result::Result<String, LlmError>>,
{
    with_timeout(timeout, async { future.await.map_err(DocError::from) }, operation_name)
        .await
        .map_err(|e| e.into_llm_error(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCategory;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DocError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, DocError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result.unwrap_err(), DocError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_task_timeout_becomes_network_error() {
        let err = with_task_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok("never".to_string())
            },
            "generate Foo",
            "mock",
        )
        .await
        .unwrap_err();

        assert_eq!(err.category, ErrorCategory::Network);
        assert_eq!(err.provider.as_deref(), Some("mock"));
        assert!(err.message.contains("generate Foo"));
    }

    #[tokio::test]
    async fn test_task_error_passes_through() {
        let err = with_task_timeout(
            Duration::from_secs(1),
            async { Err(LlmError::invalid_response("empty")) },
            "generate Foo",
            "mock",
        )
        .await
        .unwrap_err();

        assert_eq!(err.category, ErrorCategory::InvalidResponse);
    }
}
