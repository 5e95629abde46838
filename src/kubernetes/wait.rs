// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded polling

use crate::error::{KfError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Run `check` up to `max_attempts` times, sleeping `interval` between attempts.
///
/// `check` returns `Ok(Some(value))` once the awaited condition holds and
/// `Ok(None)` while it does not. An error from `check` aborts the poll
/// immediately. When every attempt comes back empty the poll fails with
/// [`KfError::Timeout`].
pub async fn poll_bounded<T, F, Fut>(
    operation: &str,
    max_attempts: u32,
    interval: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for attempt in 1..=max_attempts {
        if let Some(value) = check().await? {
            return Ok(value);
        }
        if attempt < max_attempts {
            debug!(
                "{} not ready (attempt {}/{}), retrying in {:?}",
                operation, attempt, max_attempts, interval
            );
            sleep(interval).await;
        }
    }

    Err(KfError::Timeout {
        operation: operation.to_string(),
        attempts: max_attempts,
    })
}
