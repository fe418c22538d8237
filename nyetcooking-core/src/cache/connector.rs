//! Startup connection to the shared cache backend.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::retry::{retry, RetryPolicy, Sleeper};

/// Something that can open and health-check a backend connection.
#[async_trait]
pub trait Connector: Send + Sync {
    type Handle: Send;

    /// Open a connection and ping it. Any error counts as one failed attempt.
    async fn connect(&self) -> Result<Self::Handle, BackendError>;
}

/// Try to connect with exponential backoff; `None` once attempts run out.
///
/// Never fatal: on `None` the caller keeps the local store for the rest of
/// the process lifetime.
pub async fn connect_with_retry<C: Connector>(
    connector: &C,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Option<C::Handle> {
    match retry(policy, sleeper, "cache backend connect", move |_| {
        connector.connect()
    })
    .await
    {
        Ok(handle) => {
            tracing::info!("connected to cache backend");
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(
                attempts = policy.max_attempts,
                error = %e,
                "cache backend unreachable, falling back to local store"
            );
            None
        }
    }
}
