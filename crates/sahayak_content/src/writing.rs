//! Writing feedback.

use derive_builder::Builder;
use derive_getters::Getters;
use sahayak_error::TemplateError;
use sahayak_flow::{
    ContentFlow, FieldSpec, FlowSpec, NormalizedRequest, Property, Reconcile, RequestSchema, Shape,
    VariantSource, Variants,
};
use serde::{Deserialize, Serialize};

const ENHANCE_WRITING_TEMPLATE: &str = "\
You are a writing tutor.

First fix every spelling and grammar mistake in the text and return the full \
corrected text as correctedText. Then point out passages whose clarity, \
style or impact could improve: for each give the original snippet, your \
rewrite and a one-line reason. Leave already correct passages alone.

Text:
{{text}}";

/// Input of [`EnhanceWritingFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into))]
pub struct EnhanceWritingRequest {
    /// Text to correct
    text: String,
}

impl EnhanceWritingRequest {
    /// Creates a builder.
    pub fn builder() -> EnhanceWritingRequestBuilder {
        EnhanceWritingRequestBuilder::default()
    }
}

/// One stylistic suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct WritingSuggestion {
    original: String,
    suggestion: String,
    explanation: String,
}

/// Corrected text and suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct WritingFeedback {
    corrected_text: String,
    suggestions: Vec<WritingSuggestion>,
}

impl Reconcile for WritingFeedback {
    /// Falls back to the caller's own text with no suggestions.
    fn placeholder(_variants: &Variants, _label: &str, request: &NormalizedRequest) -> Self {
        Self {
            corrected_text: request.text("text").unwrap_or_default().to_string(),
            suggestions: Vec::new(),
        }
    }
}

/// Grammar correction plus style suggestions.
pub struct EnhanceWritingFlow {
    spec: FlowSpec,
}

impl EnhanceWritingFlow {
    /// Flow name.
    pub const NAME: &'static str = "enhance_writing";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let suggestion = Shape::object([
            Property::new("original", Shape::String),
            Property::new("suggestion", Shape::String),
            Property::new("explanation", Shape::String)
                .describe("e.g. Improves clarity, Corrects grammar"),
        ]);
        let spec = FlowSpec::new(
            Self::NAME,
            ENHANCE_WRITING_TEMPLATE,
            RequestSchema::new(vec![FieldSpec::text("text")]),
            Shape::object([
                Property::new("correctedText", Shape::String),
                Property::new("suggestions", Shape::array(suggestion)),
            ]),
            VariantSource::Fixed("text"),
            "Writing feedback",
        )?
        .with_description("Correct grammar and suggest style improvements");
        Ok(Self { spec })
    }
}

impl ContentFlow for EnhanceWritingFlow {
    type Input = EnhanceWritingRequest;
    type Output = WritingFeedback;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}
