//! Driver wrapper that enforces client-side quotas.

use async_trait::async_trait;
use sahayak_core::{GenerateRequest, GenerateResponse};
use sahayak_error::TransportError;
use sahayak_interface::GenerativeDriver;
use sahayak_rate_limit::{RateLimitConfig, RateLimiter};
use tracing::{debug, instrument};

/// Output tokens assumed when a request sets no limit.
const DEFAULT_OUTPUT_ESTIMATE: u64 = 2_048;

/// Waits for rate limit permission before every call to the inner driver.
///
/// # Example
///
/// ```rust,ignore
/// use sahayak_models::{GeminiClient, RateLimitedDriver};
/// use sahayak_rate_limit::RateLimitTier;
///
/// let driver = RateLimitedDriver::new(GeminiClient::from_env()?, &RateLimitTier::Free.config());
/// ```
pub struct RateLimitedDriver<D> {
    inner: D,
    limiter: RateLimiter,
}

impl<D: GenerativeDriver> RateLimitedDriver<D> {
    /// Wraps `inner` with the given quotas.
    pub fn new(inner: D, config: &RateLimitConfig) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(config),
        }
    }

    /// The wrapped driver.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// The limiter guarding the wrapped driver.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Rough token cost: four characters per prompt token plus the output
    /// allowance.
    pub fn estimate_tokens(request: &GenerateRequest) -> u64 {
        let prompt_chars: usize = request
            .messages()
            .iter()
            .map(|m| m.text().len())
            .chain(request.system_instruction().iter().map(String::len))
            .sum();
        let output = (*request.max_tokens())
            .map(u64::from)
            .unwrap_or(DEFAULT_OUTPUT_ESTIMATE);
        (prompt_chars as u64).div_ceil(4) + output
    }
}

#[async_trait]
impl<D: GenerativeDriver> GenerativeDriver for RateLimitedDriver<D> {
    #[instrument(skip_all, fields(provider = self.inner.provider_name()))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        let estimated_tokens = Self::estimate_tokens(request);
        let _guard = self.limiter.acquire(estimated_tokens).await;
        debug!(estimated_tokens, "Rate limit cleared");
        self.inner.generate(request).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
