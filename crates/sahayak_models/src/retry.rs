//! Driver wrapper that retries transient transport failures.

use async_trait::async_trait;
use sahayak_core::{GenerateRequest, GenerateResponse};
use sahayak_error::{RetryableError, TransportError};
use sahayak_interface::GenerativeDriver;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{instrument, warn};

/// Retries calls that fail with a retryable [`TransportError`].
///
/// The first failure picks the backoff schedule through
/// [`RetryableError::retry_strategy_params`], so a 429 waits longer than a
/// dropped connection. Permanent failures (bad key, 400) return at once.
pub struct RetryingDriver<D> {
    inner: D,
    max_retries: Option<usize>,
}

impl<D: GenerativeDriver> RetryingDriver<D> {
    /// Wraps `inner` using the per-error retry schedule.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            max_retries: None,
        }
    }

    /// Caps the number of retries regardless of error kind.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// The wrapped driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    async fn attempt(&self, request: &GenerateRequest) -> Result<GenerateResponse, RetryError<TransportError>> {
        self.inner.generate(request).await.map_err(|e| {
            if e.is_retryable() {
                warn!(error = %e, "Transient transport failure, will retry");
                RetryError::transient(e)
            } else {
                RetryError::permanent(e)
            }
        })
    }
}

#[async_trait]
impl<D: GenerativeDriver> GenerativeDriver for RetryingDriver<D> {
    #[instrument(skip_all, fields(provider = self.inner.provider_name()))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        let first = match self.inner.generate(request).await {
            Ok(response) => return Ok(response),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => e,
        };

        let (initial_backoff_ms, default_retries, max_delay_secs) = first.retry_strategy_params();
        let retries = self.max_retries.unwrap_or(default_retries);
        if retries == 0 {
            return Err(first);
        }
        warn!(
            error = %first,
            retries,
            initial_backoff_ms,
            "Retrying after transient transport failure"
        );

        let mut strategy = ExponentialBackoff::from_millis(2)
            .factor(initial_backoff_ms.max(2) / 2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(retries);

        // The first failure already happened outside the retry loop, so wait
        // out its delay here and let the loop own the remaining attempts.
        if let Some(delay) = strategy.next() {
            tokio::time::sleep(delay).await;
        }
        Retry::spawn(strategy, || self.attempt(request)).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
