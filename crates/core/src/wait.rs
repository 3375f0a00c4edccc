//! Connection wait loop
//!
//! Blocks until a liveness probe succeeds or the timeout elapses. Only
//! server reachability is verified, never the existence of the target
//! database.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Call `probe` until it succeeds or `timeout` elapses.
///
/// The probe runs once up front; afterwards it is retried every
/// `interval`. Each retry invokes `on_retry` once, purely as a progress
/// signal for the caller. On timeout the last probe error is reported.
pub async fn wait_for_connection<P, Fut, R>(
    mut probe: P,
    interval: Duration,
    timeout: Duration,
    mut on_retry: R,
) -> EngineResult<()>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = EngineResult<()>>,
    R: FnMut(),
{
    let mut last_error = match probe().await {
        Ok(()) => return Ok(()),
        Err(err) => err,
    };

    let start = Instant::now();
    while start.elapsed() < timeout {
        on_retry();
        sleep(interval).await;

        match probe().await {
            Ok(()) => return Ok(()),
            Err(err) => {
                debug!("database not ready: {}", err);
                last_error = err;
            }
        }
    }

    Err(EngineError::ConnectionTimeout {
        last_error: last_error.to_string(),
    })
}
