//! The caller-facing pipeline.
//!
//! `Received -> Normalized -> Invoked -> Succeeded | Reconciled`, with
//! `Rejected` (validation) and `Failed` (transport) as terminal error
//! branches.

#[cfg(feature = "metrics")]
use crate::FlowMetrics;
use crate::{
    ContentFlow, FallbackEvent, FlowSpec, GenerationResult, GenerationSettings, RawRequest,
    Reconcile, Reconciler, StructuredInvoker,
};
use derive_getters::Getters;
use sahayak_error::{JsonError, SahayakResult};
use sahayak_interface::GenerativeDriver;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// A reconciled value plus what happened on the way.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct FlowOutcome<T> {
    /// Per-call identifier, also recorded on the tracing span
    request_id: Uuid,
    /// Complete output
    value: T,
    /// Placeholder substitution, if one happened
    fallback: Option<FallbackEvent>,
}

impl<T> FlowOutcome<T> {
    /// Unwraps the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Whether any placeholder content was substituted.
    pub fn fell_back(&self) -> bool {
        self.fallback.is_some()
    }

    /// Converts the value, keeping the run metadata.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<FlowOutcome<U>, E> {
        Ok(FlowOutcome {
            request_id: self.request_id,
            value: f(self.value)?,
            fallback: self.fallback,
        })
    }
}

/// Runs flows against a driver.
///
/// Stateless between calls; share one runner (behind `Arc` if needed)
/// across tasks.
///
/// # Example
///
/// ```rust,ignore
/// use sahayak_flow::FlowRunner;
/// use sahayak_models::GeminiClient;
///
/// let runner = FlowRunner::new(GeminiClient::from_env()?);
/// let quiz = runner.run(&QuizFlow::new()?, &input).await?;
/// ```
pub struct FlowRunner<D> {
    invoker: StructuredInvoker<D>,
    #[cfg(feature = "metrics")]
    metrics: FlowMetrics,
}

impl<D: GenerativeDriver> FlowRunner<D> {
    /// Creates a runner with default generation settings.
    pub fn new(driver: D) -> Self {
        Self::with_settings(driver, GenerationSettings::default())
    }

    /// Creates a runner with explicit generation settings.
    pub fn with_settings(driver: D, settings: GenerationSettings) -> Self {
        Self {
            invoker: StructuredInvoker::with_settings(driver, settings),
            #[cfg(feature = "metrics")]
            metrics: FlowMetrics::new(),
        }
    }

    /// The invoker used for model calls.
    pub fn invoker(&self) -> &StructuredInvoker<D> {
        &self.invoker
    }

    /// Runs a typed flow.
    ///
    /// # Errors
    ///
    /// Validation and transport failures propagate; an empty model answer
    /// never does.
    pub async fn run<F: ContentFlow>(&self, flow: &F, input: &F::Input) -> SahayakResult<F::Output> {
        let raw = to_raw(input)?;
        self.run_raw(flow.spec(), &raw).await
    }

    /// Runs a flow definition against an untyped request.
    pub async fn run_raw<T>(&self, spec: &FlowSpec, raw: &RawRequest) -> SahayakResult<T>
    where
        T: DeserializeOwned + Reconcile + Send,
    {
        self.run_detailed(spec, raw)
            .await
            .map(FlowOutcome::into_value)
    }

    /// Runs a flow and reports whether a fallback happened.
    #[instrument(
        skip_all,
        fields(flow = spec.name(), request_id = tracing::field::Empty)
    )]
    pub async fn run_detailed<T>(
        &self,
        spec: &FlowSpec,
        raw: &RawRequest,
    ) -> SahayakResult<FlowOutcome<T>>
    where
        T: DeserializeOwned + Reconcile + Send,
    {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));
        let started = std::time::Instant::now();
        debug!(fields = raw.len(), "Received");

        let request = match spec.prepare(raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(field = %e.field, error = %e.kind, "Rejected");
                self.record_run(spec, "rejected", started);
                return Err(e.into());
            }
        };
        debug!("Normalized");

        let variants = spec.variants().resolve(&request);
        let prompt = spec.template().render(&request.to_value());
        debug!(variants = variants.len(), prompt_len = prompt.len(), "Invoked");

        let result: GenerationResult<T> =
            match self.invoker.invoke(prompt, spec.shape(), &variants).await {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "Failed");
                    self.record_run(spec, "failed", started);
                    return Err(e.into());
                }
            };

        let reconciler = Reconciler::new(
            spec.name(),
            spec.placeholder_label(),
            spec.identifying_fields(),
        );
        let (value, fallback) = reconciler.reconcile(result, &variants, &request);

        match &fallback {
            Some(event) => {
                debug!(fell_back = event.variants.len(), "Reconciled");
                self.record_fallback(spec, event);
                self.record_run(spec, "reconciled", started);
            }
            None => {
                info!(elapsed_ms = started.elapsed().as_millis() as u64, "Succeeded");
                self.record_run(spec, "succeeded", started);
            }
        }

        Ok(FlowOutcome {
            request_id,
            value,
            fallback,
        })
    }

    #[cfg(feature = "metrics")]
    fn record_run(&self, spec: &FlowSpec, outcome: &'static str, started: std::time::Instant) {
        self.metrics
            .record_run(spec.name(), outcome, started.elapsed().as_secs_f64());
    }

    #[cfg(not(feature = "metrics"))]
    fn record_run(&self, _spec: &FlowSpec, _outcome: &'static str, _started: std::time::Instant) {}

    #[cfg(feature = "metrics")]
    fn record_fallback(&self, spec: &FlowSpec, event: &FallbackEvent) {
        let reason = event.reason.as_ref().map(|r| r.code()).unwrap_or("partial");
        self.metrics.record_fallback(spec.name(), reason);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_fallback(&self, _spec: &FlowSpec, _event: &FallbackEvent) {}
}

/// Serializes a typed input into a request map.
///
/// # Errors
///
/// Returns a [`JsonError`] if the input does not serialize to a JSON object.
pub fn to_raw<I: Serialize>(input: &I) -> Result<RawRequest, JsonError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(JsonError::new(format!(
            "Flow input must serialize to an object, got {}",
            crate::json_type_name(&other)
        ))),
        Err(e) => Err(JsonError::new(format!("Failed to serialize flow input: {}", e))),
    }
}
