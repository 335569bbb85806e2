//! Bounded retry with a fixed delay.

use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

use crate::config::RetryConfig;

/// Run `operation` until it yields `Some`, at most `policy.attempts` times.
///
/// Both `Ok(None)` and `Err` count as a failed attempt and are logged with
/// the attempt number. The delay is only applied between attempts, never
/// after the last one. Returns `None` once attempts are exhausted.
pub async fn retry_until_some<T, E, Fut, F>(
    policy: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Option<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    let attempts = policy.attempts.max(1);

    for attempt in 1..=attempts {
        match operation(attempt).await {
            Ok(Some(value)) => {
                if attempt > 1 {
                    debug!(operation = %operation_name, attempt = attempt, "Succeeded after retry");
                }
                return Some(value);
            }
            Ok(None) => warn!(
                operation = %operation_name,
                attempt = attempt,
                max_attempts = attempts,
                "Attempt returned no result"
            ),
            Err(e) => warn!(
                operation = %operation_name,
                attempt = attempt,
                max_attempts = attempts,
                error = %e,
                "Attempt failed"
            ),
        }

        if attempt < attempts {
            tokio::time::sleep(policy.delay()).await;
        }
    }

    warn!(
        operation = %operation_name,
        attempts = attempts,
        "Giving up after max attempts"
    );
    None
}
