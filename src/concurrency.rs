//! Bounds on concurrent collaborator calls.
//!
//! Both knobs are off unless configured: without them every article and
//! every classification of a batch is in flight at once and a hung call
//! blocks its batch indefinitely.
//!
//! A timeout only abandons the awaiting side. Work already handed to
//! `spawn_blocking` (parsing, a local classifier call) keeps running on its
//! thread, and runtime shutdown waits for it, so a hung blocking call still
//! delays process exit until it returns.

use crate::error::{NewsError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::warn;

/// Await `fut`, failing with [`NewsError::Timeout`] once `limit` elapses.
pub async fn with_timeout<T, Fut>(stage: &'static str, limit: Option<Duration>, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match limit {
        Some(after) => match tokio::time::timeout(after, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(stage, ?after, "Call timed out");
                Err(NewsError::Timeout { stage, after })
            }
        },
        None => fut.await,
    }
}

/// Caps in-flight calls of one stage and applies the per-call timeout.
///
/// Clones share the same permits.
#[derive(Debug, Clone, Default)]
pub struct Limiter {
    permits: Option<Arc<Semaphore>>,
    call_timeout: Option<Duration>,
}

impl Limiter {
    /// `max_concurrency` of `None` or `Some(0)` means unbounded.
    pub fn new(max_concurrency: Option<usize>, call_timeout: Option<Duration>) -> Self {
        Self {
            permits: max_concurrency
                .filter(|n| *n > 0)
                .map(|n| Arc::new(Semaphore::new(n))),
            call_timeout,
        }
    }

    /// Run `fut` once a permit is free. The timeout starts after the permit
    /// is acquired.
    pub async fn run<T, Fut>(&self, stage: &'static str, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let _permit = match &self.permits {
            Some(semaphore) => Some(semaphore.acquire().await?),
            None => None,
        };
        with_timeout(stage, self.call_timeout, fut).await
    }
}
