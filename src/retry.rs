//! Retry with exponential backoff for transient provider failures.
//!
//! The loop itself treats collaborator errors as terminal; transient LLM
//! provider hiccups are retried at the caller layer instead, by wrapping the
//! injected validator/corrector in the decorators here.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::hooks::{StageCorrector, StageValidator};

/// Backoff policy: fixed base delay, doubling per attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay before retry number `attempt` (0-indexed): base * 2^attempt,
    /// with the exponent capped at 6.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt.min(6))
    }
}

/// Run `op`, retrying on error with exponential backoff until the policy's
/// attempt budget is exhausted. The last error is propagated on give-up.
pub async fn retry_with_backoff<T, F, Fut>(policy: RetryPolicy, step: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts.max(1) {
                    tracing::warn!(step, attempts = attempt, error = %err, "Retries exhausted");
                    return Err(err);
                }
                let delay = policy.delay_for(attempt - 1);
                tracing::warn!(
                    step,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Validator decorator that retries transient failures.
pub struct RetryingValidator<V> {
    inner: V,
    policy: RetryPolicy,
}

impl<V> RetryingValidator<V> {
    pub fn new(inner: V, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<V> StageValidator for RetryingValidator<V>
where
    V: StageValidator,
{
    async fn validate(&self, result: &Value) -> Result<Value> {
        retry_with_backoff(self.policy, "validation", || self.inner.validate(result)).await
    }
}

/// Corrector decorator that retries transient failures.
pub struct RetryingCorrector<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> RetryingCorrector<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C> StageCorrector for RetryingCorrector<C>
where
    C: StageCorrector,
{
    async fn correct(&self, result: &Value, validation: &Value) -> Result<Value> {
        retry_with_backoff(self.policy, "correction", || self.inner.correct(result, validation)).await
    }
}
