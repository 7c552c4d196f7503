//! Request deadlines and cancellation
//!
//! Every dispatch runs under a single deadline covering both sending and body
//! reading. A caller-supplied [`CancellationToken`] is raced against it so an
//! explicit cancel is never reported as a timeout.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Effective timeout: the requested one unless absent or zero
pub fn resolve_timeout(requested: Option<Duration>, default: Duration) -> Duration {
    requested.filter(|t| !t.is_zero()).unwrap_or(default)
}

/// Run `future` under `timeout`, aborting early when `cancellation` fires
pub async fn with_deadline<F, T>(
    future: F,
    timeout: Duration,
    cancellation: Option<&CancellationToken>,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let guarded = tokio::time::timeout(timeout, future);

    let outcome = match cancellation {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(Error::Cancelled),
                outcome = guarded => outcome,
            }
        }
        None => guarded.await,
    };

    outcome.map_err(|_| Error::Timeout { timeout })?
}
