//! Generative model driver trait.

use async_trait::async_trait;
use sahayak_core::{GenerateRequest, GenerateResponse};
use sahayak_error::TransportError;
use std::sync::Arc;

/// A backend that turns one request into one model response.
///
/// Implementations report only transport failures as errors. A response the
/// model chose to leave empty, block, or fill with unparseable text is still
/// `Ok`; classifying it is the caller's job.
///
/// # Example
///
/// ```rust,ignore
/// use sahayak_interface::GenerativeDriver;
///
/// let response = driver.generate(&request).await?;
/// println!("{} answered with {} parts", driver.provider_name(), response.outputs().len());
/// ```
#[async_trait]
pub trait GenerativeDriver: Send + Sync {
    /// Send a request and wait for the complete response.
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError>;

    /// Provider identifier used in logs (e.g. "gemini").
    fn provider_name(&self) -> &'static str;

    /// Model the driver sends requests to when the request names none.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<D> GenerativeDriver for Arc<D>
where
    D: GenerativeDriver + ?Sized,
{
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        (**self).generate(request).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<D> GenerativeDriver for Box<D>
where
    D: GenerativeDriver + ?Sized,
{
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        (**self).generate(request).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
