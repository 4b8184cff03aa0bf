use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use super::breaker::{BreakerDecision, CircuitBreaker};
use super::error::UpstreamError;

/// Retry budget for one logical upstream call. `max_attempts` counts the
/// initial attempt; backoff doubles from `base_delay` per attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }
}

/// Run one upstream operation under the shared breaker and retry policy.
///
/// Every attempt asks the breaker first: an open breaker rejects without
/// any network I/O and is not retried, so a request arriving during the
/// cooldown fails fast. Attempt outcomes feed the breaker, which means a
/// half-open probe that fails re-opens it and the following retry (if the
/// error was transient) terminates on the rejected attempt.
pub async fn with_resilience<T, F, Fut>(
    breaker: &CircuitBreaker,
    policy: &RetryPolicy,
    op: F,
) -> Result<T, UpstreamError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let attempt = || async {
        match breaker.check() {
            BreakerDecision::Reject => Err(UpstreamError::BreakerOpen(breaker.target().to_string())),
            BreakerDecision::Allow => match op().await {
                Ok(value) => {
                    breaker.record_success();
                    Ok(value)
                }
                Err(e) => {
                    breaker.record_failure();
                    Err(e)
                }
            },
        }
    };

    attempt
        .retry(
            &ExponentialBuilder::default()
                .with_min_delay(policy.base_delay)
                .with_max_times(policy.max_attempts.saturating_sub(1) as usize)
                .with_jitter(),
        )
        .when(|e: &UpstreamError| e.is_transient())
        .notify(|e, dur| {
            warn!(
                "upstream call to '{}' failed, retrying after {:.2}s: {}",
                breaker.target(),
                dur.as_secs_f64(),
                e
            )
        })
        .await
}
