//! Structured generation.
//!
//! Sends one prompt with a response schema and classifies what comes back.
//! Transport failures are errors; everything the model itself produced,
//! including nothing at all, is a [`GenerationResult`].

use crate::{Shape, Variants};
use derive_getters::Getters;
use sahayak_core::{GenerateRequest, GenerateResponse, Message, Output, ResponseFormat};
use sahayak_error::TransportError;
use sahayak_interface::GenerativeDriver;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Why a model answer was unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum EmptyReason {
    /// No candidates or no text at all
    #[display("no content")]
    NoContent,
    /// The provider stopped with a refusal finish reason
    #[display("declined ({})", _0)]
    Declined(String),
    /// Text that is not JSON, even after removing Markdown fences
    #[display("unparseable")]
    Unparseable,
    /// JSON that does not fit the declared shape
    #[display("shape mismatch ({})", _0)]
    ShapeMismatch(String),
}

impl EmptyReason {
    /// Short stable code for metric labels.
    pub fn code(&self) -> &'static str {
        match self {
            EmptyReason::NoContent => "no_content",
            EmptyReason::Declined(_) => "declined",
            EmptyReason::Unparseable => "unparseable",
            EmptyReason::ShapeMismatch(_) => "shape_mismatch",
        }
    }
}

/// Outcome of one structured model call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult<T> {
    /// Output that fits the declared shape
    Success(T),
    /// The model responded but nothing usable came back
    Empty(EmptyReason),
}

impl<T> GenerationResult<T> {
    /// Whether the model produced usable output.
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }

    /// The output, if any.
    pub fn success(self) -> Option<T> {
        match self {
            GenerationResult::Success(value) => Some(value),
            GenerationResult::Empty(_) => None,
        }
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GenerationResult<U> {
        match self {
            GenerationResult::Success(value) => GenerationResult::Success(f(value)),
            GenerationResult::Empty(reason) => GenerationResult::Empty(reason),
        }
    }
}

/// Sampling settings applied to every structured call.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    Getters,
    derive_builder::Builder,
)]
#[builder(default, setter(strip_option))]
pub struct GenerationSettings {
    /// Model override; `None` uses the driver's model
    #[builder(setter(into, strip_option))]
    model: Option<String>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Maximum output tokens
    max_output_tokens: Option<u32>,
}

impl GenerationSettings {
    /// Creates a builder for GenerationSettings.
    pub fn builder() -> GenerationSettingsBuilder {
        GenerationSettingsBuilder::default()
    }
}

/// Pulls a JSON value out of model text.
///
/// Accepts bare JSON, JSON wrapped in a Markdown code fence, or JSON
/// surrounded by prose (the outermost object or array is used).
///
/// # Examples
///
/// ```
/// use sahayak_flow::extract_json;
/// use serde_json::json;
///
/// let text = "```json\n{\"en\": \"Hello\"}\n```";
/// assert_eq!(extract_json(text), Some(json!({"en": "Hello"})));
/// assert_eq!(extract_json("I cannot help with that."), None);
/// ```
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = strip_fence(text.trim());
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let start = trimmed.find(['{', '['])?;
    let close = if trimmed[start..].starts_with('{') { '}' } else { ']' };
    let end = trimmed.rfind(close)?;
    (end > start)
        .then(|| serde_json::from_str(&trimmed[start..=end]).ok())
        .flatten()
}

fn strip_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. "json") on the opening line.
    let body = body.split_once('\n').map(|(_, rest)| rest).unwrap_or(body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Classifies a model response against a shape and typed output.
///
/// Refusals win over content: a blocked finish reason is `Declined` even if
/// partial text arrived.
pub fn classify<T: DeserializeOwned>(response: &GenerateResponse, shape: &Shape) -> GenerationResult<T> {
    if let Some(reason) = response.finish_reason().as_ref().filter(|r| r.is_refusal()) {
        return GenerationResult::Empty(EmptyReason::Declined(reason.to_string()));
    }

    let decoded = response.outputs().iter().find_map(|output| match output {
        Output::Json(value) if !value.is_null() => Some(value.clone()),
        _ => None,
    });

    let value = match decoded {
        Some(value) => value,
        None => {
            let Some(text) = response.text().filter(|t| !t.trim().is_empty()) else {
                return GenerationResult::Empty(EmptyReason::NoContent);
            };
            match extract_json(&text) {
                Some(value) => value,
                None => return GenerationResult::Empty(EmptyReason::Unparseable),
            }
        }
    };

    if value.is_null() {
        return GenerationResult::Empty(EmptyReason::NoContent);
    }

    let conformed = match shape.conform(&value) {
        Ok(conformed) => conformed,
        Err(mismatch) => return GenerationResult::Empty(EmptyReason::ShapeMismatch(mismatch.to_string())),
    };

    if matches!(shape, Shape::Keyed) && conformed.as_object().is_some_and(|m| m.is_empty()) {
        return GenerationResult::Empty(EmptyReason::NoContent);
    }

    match serde_json::from_value(conformed) {
        Ok(typed) => GenerationResult::Success(typed),
        Err(e) => GenerationResult::Empty(EmptyReason::ShapeMismatch(e.to_string())),
    }
}

/// Sends structured generation requests through a driver.
///
/// Makes exactly one driver call per invocation. Retrying is the driver's
/// business (see `RetryingDriver` in `sahayak_models`).
#[derive(Debug, Clone)]
pub struct StructuredInvoker<D> {
    driver: D,
    settings: GenerationSettings,
}

impl<D: GenerativeDriver> StructuredInvoker<D> {
    /// Creates an invoker with default settings.
    pub fn new(driver: D) -> Self {
        Self::with_settings(driver, GenerationSettings::default())
    }

    /// Creates an invoker with explicit settings.
    pub fn with_settings(driver: D, settings: GenerationSettings) -> Self {
        Self { driver, settings }
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Settings applied to every call.
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Builds the provider request for a rendered prompt.
    pub fn request(&self, prompt: String, shape: &Shape, variants: &Variants) -> GenerateRequest {
        let mut builder = GenerateRequest::builder();
        builder
            .messages(vec![Message::user(prompt)])
            .response_format(ResponseFormat::Json {
                schema: shape.to_response_schema(variants),
            });
        if let Some(model) = self.settings.model() {
            builder.model(model.clone());
        }
        if let Some(temperature) = self.settings.temperature() {
            builder.temperature(*temperature);
        }
        if let Some(max_tokens) = self.settings.max_output_tokens() {
            builder.max_tokens(*max_tokens);
        }
        // Messages are always set, so the builder cannot fail.
        builder.build().unwrap_or_default()
    }

    /// Sends `prompt` and classifies the answer.
    ///
    /// # Errors
    ///
    /// Returns the driver's [`TransportError`] unchanged.
    #[instrument(skip_all, fields(provider = self.driver.provider_name(), prompt_len = prompt.len()))]
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        prompt: String,
        shape: &Shape,
        variants: &Variants,
    ) -> Result<GenerationResult<T>, TransportError> {
        let request = self.request(prompt, shape, variants);
        let response = self.driver.generate(&request).await?;

        let result = classify(&response, shape);
        match &result {
            GenerationResult::Success(_) => debug!("Structured output accepted"),
            GenerationResult::Empty(reason) => debug!(%reason, "Structured output empty"),
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyedContent, Property};
    use sahayak_core::FinishReason;
    use serde_json::json;

    fn text(t: &str) -> GenerateResponse {
        GenerateResponse::new(vec![Output::Text(t.to_string())])
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Title {
        title: String,
    }

    fn title_shape() -> Shape {
        Shape::object([Property::new("title", Shape::String)])
    }

    #[test]
    fn fenced_json_is_accepted() {
        let result: GenerationResult<Title> =
            classify(&text("```json\n{\"title\": \"Soil\"}\n```"), &title_shape());
        assert_eq!(
            result,
            GenerationResult::Success(Title {
                title: "Soil".into()
            })
        );
    }

    #[test]
    fn prose_around_json_is_tolerated() {
        let result: GenerationResult<Title> =
            classify(&text("Here you go: {\"title\": \"Soil\"} Enjoy!"), &title_shape());
        assert!(result.is_success());
    }

    #[test]
    fn empty_and_missing_text_is_no_content() {
        let none: GenerationResult<Title> = classify(&GenerateResponse::default(), &title_shape());
        assert_eq!(none, GenerationResult::Empty(EmptyReason::NoContent));

        let blank: GenerationResult<Title> = classify(&text("   "), &title_shape());
        assert_eq!(blank, GenerationResult::Empty(EmptyReason::NoContent));

        let null: GenerationResult<Title> = classify(&text("null"), &title_shape());
        assert_eq!(null, GenerationResult::Empty(EmptyReason::NoContent));
    }

    #[test]
    fn refusal_is_declined() {
        let response = GenerateResponse::builder()
            .outputs(vec![Output::Text("{\"title\": \"x\"}".into())])
            .finish_reason(Some(FinishReason::Safety))
            .build()
            .unwrap();
        let result: GenerationResult<Title> = classify(&response, &title_shape());
        assert_eq!(
            result,
            GenerationResult::Empty(EmptyReason::Declined("SAFETY".into()))
        );
    }

    #[test]
    fn max_tokens_is_not_a_refusal() {
        let response = GenerateResponse::builder()
            .outputs(vec![Output::Text("{\"title\": \"x\"}".into())])
            .finish_reason(Some(FinishReason::MaxTokens))
            .build()
            .unwrap();
        let result: GenerationResult<Title> = classify(&response, &title_shape());
        assert!(result.is_success());
    }

    #[test]
    fn prose_is_unparseable() {
        let result: GenerationResult<Title> = classify(&text("Sorry, I can't."), &title_shape());
        assert_eq!(result, GenerationResult::Empty(EmptyReason::Unparseable));
    }

    #[test]
    fn wrong_shape_is_a_mismatch() {
        let result: GenerationResult<Title> = classify(&text("{\"name\": \"x\"}"), &title_shape());
        assert!(matches!(
            result,
            GenerationResult::Empty(EmptyReason::ShapeMismatch(_))
        ));
    }

    #[test]
    fn keyed_answers_are_lenient_per_entry() {
        let result: GenerationResult<KeyedContent> =
            classify(&text("{\"en\": \"Hello\", \"fr\": 7}"), &Shape::Keyed);
        assert_eq!(
            result,
            GenerationResult::Success(KeyedContent::new([("en", "Hello")]))
        );

        let nothing: GenerationResult<KeyedContent> = classify(&text("{\"fr\": 7}"), &Shape::Keyed);
        assert_eq!(nothing, GenerationResult::Empty(EmptyReason::NoContent));
    }

    #[test]
    fn provider_decoded_json_is_preferred() {
        let response = GenerateResponse::new(vec![Output::Json(json!({"title": "Rain"}))]);
        let result: GenerationResult<Title> = classify(&response, &title_shape());
        assert_eq!(
            result.success(),
            Some(Title {
                title: "Rain".into()
            })
        );
    }

    #[test]
    fn extract_json_handles_fences_without_language() {
        assert_eq!(extract_json("```\n[1, 2]\n```"), Some(json!([1, 2])));
        assert_eq!(extract_json("```json {\"a\": 1}```"), Some(json!({"a": 1})));
    }
}
