//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with an optional deadline
//! - Distinguish timeouts from other upstream failures
//!
//! # Design Decisions
//! - No deadline unless one is configured
//! - The deadline covers the wait for response headers, not body streaming
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use hyper_util::client::legacy::Error as ClientError;

use crate::http::response::ProxyError;

/// Await `fut`, failing with [`ProxyError::Timeout`] once `limit` elapses.
pub async fn upstream_deadline<F, T>(limit: Option<Duration>, fut: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ProxyError::Timeout(limit))?
            .map_err(ProxyError::from),
        None => fut.await.map_err(ProxyError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expires_when_limit_set() {
        let fut = std::future::pending::<Result<(), ClientError>>();
        let result = upstream_deadline(Some(Duration::from_millis(20)), fut).await;
        assert!(matches!(result, Err(ProxyError::Timeout(_))));
    }

    #[tokio::test]
    async fn passes_through_without_limit() {
        let fut = async { Ok::<_, ClientError>(7) };
        assert_eq!(upstream_deadline(None, fut).await.unwrap(), 7);
    }
}
