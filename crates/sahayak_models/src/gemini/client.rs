//! Gemini REST client.

use super::conversions;
use super::dto::{GeminiErrorEnvelope, GeminiResponse};
use async_trait::async_trait;
use reqwest::Client;
use sahayak_core::{GenerateRequest, GenerateResponse};
use sahayak_error::{TransportError, TransportErrorKind};
use sahayak_interface::GenerativeDriver;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Model used when neither the client nor the request names one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables searched for an API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Request timeout used by [`GeminiClient::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the Gemini `generateContent` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use sahayak_models::GeminiClient;
///
/// let client = GeminiClient::from_env()?.with_model("gemini-2.0-flash");
/// let response = client.generate(&request).await?;
/// ```
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client with an explicit API key and the default model.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    #[instrument(skip(api_key))]
    pub fn new(api_key: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Creates a client whose requests give up after `timeout`.
    pub fn with_timeout(
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            TransportError::new(TransportErrorKind::ClientCreation(e.to_string()))
        })?;

        debug!(model = DEFAULT_MODEL, ?timeout, "Created Gemini client");

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Creates a client from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportErrorKind::MissingApiKey`] when neither is set.
    pub fn from_env() -> Result<Self, TransportError> {
        Self::new(find_api_key(&API_KEY_VARS, |var| std::env::var(var).ok())?)
    }

    /// Creates a client from a named environment variable.
    pub fn from_env_var(var: &str) -> Result<Self, TransportError> {
        Self::new(find_api_key(&[var], |var| std::env::var(var).ok())?)
    }

    /// Sets the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the client at another endpoint (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn transport_error(e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::new(TransportErrorKind::Timeout(e.to_string()))
        } else {
            TransportError::new(TransportErrorKind::Network(e.to_string()))
        }
    }
}

#[async_trait]
impl GenerativeDriver for GeminiClient {
    #[instrument(skip(self, request), fields(provider = "gemini", model = tracing::field::Empty))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, TransportError> {
        let model = request.model().as_deref().unwrap_or(self.model.as_str());
        tracing::Span::current().record("model", model);

        let body = conversions::to_gemini_request(request)?;
        debug!(
            contents = body.contents().len(),
            structured = body
                .generation_config()
                .as_ref()
                .is_some_and(|c| c.response_schema().is_some()),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "HTTP request failed");
                Self::transport_error(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(Self::transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&text)
                .map(|envelope| match envelope.error.status {
                    Some(code) => format!("{}: {}", code, envelope.error.message),
                    None => envelope.error.message,
                })
                .unwrap_or(text);
            error!(status = %status, error = %message, "Gemini API error");
            return Err(TransportError::new(TransportErrorKind::HttpError {
                status_code: status.as_u16(),
                message,
            }));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response");
            TransportError::new(TransportErrorKind::MalformedEnvelope(e.to_string()))
        })?;

        debug!(candidates = parsed.candidates.len(), "Received response");
        Ok(conversions::from_gemini_response(&parsed))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// First non-blank key among `vars`, read through `lookup`.
///
/// The error names every variable that was tried.
fn find_api_key(
    vars: &[&str],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, TransportError> {
    vars.iter()
        .find_map(|var| lookup(var).filter(|key| !key.trim().is_empty()))
        .ok_or_else(|| TransportError::new(TransportErrorKind::MissingApiKey(vars.join(" or "))))
}
