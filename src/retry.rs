use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// How many times to try an operation and how long to wait between tries. There is no backoff
/// and no jitter: every wait is exactly [delay].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRetry {
    pub attempts: u32,
    pub delay: Duration,
}

impl FixedRetry {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        FixedRetry { attempts, delay }
    }
}

impl Default for FixedRetry {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }
}

/// Failure of every attempt allowed by a [FixedRetry]. Holds the error from the final attempt.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed after {attempts} attempts: {last_error}")]
pub struct RetriesExhausted<E> {
    pub operation: &'static str,
    pub attempts: u32,
    #[source]
    pub last_error: E,
}

/// Runs [operation] until it succeeds or [policy] runs out of attempts, sleeping between tries
pub async fn with_fixed_retry<T, E, F, Fut>(
    operation_name: &'static str,
    policy: FixedRetry,
    mut operation: F,
) -> Result<T, RetriesExhausted<E>>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempt, "{operation_name} succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) if attempt >= attempts => {
                return Err(RetriesExhausted {
                    operation: operation_name,
                    attempts,
                    last_error: err,
                });
            }
            Err(err) => {
                warn!(
                    attempt,
                    remaining = attempts - attempt,
                    "{operation_name} failed, retrying: {err}"
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    const QUICK: FixedRetry = FixedRetry::new(3, Duration::from_millis(1));

    #[tokio::test]
    async fn returns_first_success() {
        let call_count = AtomicU32::new(0);
        let calls = &call_count;

        let result: Result<u32, RetriesExhausted<String>> =
            with_fixed_retry("counting", QUICK, || async move {
                Ok(calls.fetch_add(1, Ordering::SeqCst))
            })
            .await;

        assert_that!(result).is_ok_containing(0);
        assert_eq!(1, call_count.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let call_count = AtomicU32::new(0);
        let calls = &call_count;

        let result = with_fixed_retry("flaky", QUICK, || async move {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call < 3 {
                Err(format!("call {call} failed"))
            } else {
                Ok(call)
            }
        })
        .await;

        assert_that!(result).is_ok_containing(3);
    }

    #[tokio::test]
    async fn gives_up_after_the_last_attempt() {
        let call_count = AtomicU32::new(0);
        let calls = &call_count;

        let result: Result<(), _> = with_fixed_retry("doomed", QUICK, || async move {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Err(format!("call {call} failed"))
        })
        .await;

        let Err(exhausted) = result else {
            panic!("Expected retries to run out");
        };
        assert_eq!(3, exhausted.attempts);
        assert_eq!("call 3 failed", exhausted.last_error);
        assert_eq!(3, call_count.load(Ordering::SeqCst));
    }
}
