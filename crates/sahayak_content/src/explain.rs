//! Kid-friendly explanations.

use crate::common::{any_grade, unavailable};
use derive_builder::Builder;
use derive_getters::Getters;
use sahayak_error::TemplateError;
use sahayak_flow::{
    ContentFlow, FieldSpec, FlowSpec, NormalizedRequest, Property, Reconcile, RequestSchema, Shape,
    VariantSource, Variants,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ASK_TEMPLATE: &str = "\
You are Sahayak, a friendly and knowledgeable assistant for students. You \
explain concepts in a simple, engaging way.

Explain the following concept to a student in grade {{gradeLevel}}.
The explanation must be in {{languageName}}.

Use simple words, short sentences, and analogies or examples that a child at \
that grade level can relate to. Do not open with \"Of course!\" or \
\"Certainly!\"; give the explanation directly.

Question: {{{question}}}";

/// Languages explanations can be requested in, by ISO 639-1 code.
pub const EXPLANATION_LANGUAGES: [(&str, &str); 7] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
];

/// Display name of a language code; unknown codes explain in English.
///
/// # Examples
///
/// ```
/// use sahayak_content::language_name;
///
/// assert_eq!(language_name("ta"), "Tamil");
/// assert_eq!(language_name(" HI "), "Hindi");
/// assert_eq!(language_name("xx"), "English");
/// ```
pub fn language_name(code: &str) -> &'static str {
    let code = code.trim();
    EXPLANATION_LANGUAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or("English")
}

/// Input of [`AskSahayakFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct AskSahayakRequest {
    /// Question or concept to explain
    question: String,
    /// Grade of the student asking
    grade_level: u32,
    /// ISO 639-1 code of the answer language
    language: String,
}

impl AskSahayakRequest {
    /// Creates a builder.
    pub fn builder() -> AskSahayakRequestBuilder {
        AskSahayakRequestBuilder::default()
    }
}

/// A simplified explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Explanation {
    answer: String,
}

impl Reconcile for Explanation {
    fn placeholder(variants: &Variants, label: &str, _request: &NormalizedRequest) -> Self {
        Self {
            answer: unavailable(label, variants),
        }
    }
}

/// Explains a concept at a student's grade level, in their language.
pub struct AskSahayakFlow {
    spec: FlowSpec,
}

impl AskSahayakFlow {
    /// Flow name.
    pub const NAME: &'static str = "ask_sahayak";

    /// Builds the flow.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in template does not compile.
    pub fn new() -> Result<Self, TemplateError> {
        let spec = FlowSpec::new(
            Self::NAME,
            ASK_TEMPLATE,
            RequestSchema::new(vec![
                FieldSpec::text("question"),
                any_grade(),
                FieldSpec::text("language"),
            ]),
            Shape::object([Property::new("answer", Shape::String)
                .describe("The simplified, kid-friendly explanation")]),
            VariantSource::Single("question"),
            "Answer",
        )?
        .with_description("Kid-friendly explanation of a question")
        .identified_by(&["question", "gradeLevel", "language"])
        .with_derived("languageName", |request| {
            Value::String(language_name(request.text("language").unwrap_or_default()).to_string())
        });
        Ok(Self { spec })
    }
}

impl ContentFlow for AskSahayakFlow {
    type Input = AskSahayakRequest;
    type Output = Explanation;

    fn spec(&self) -> &FlowSpec {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_language_maps_to_its_name() {
        for (code, name) in EXPLANATION_LANGUAGES {
            assert_eq!(language_name(code), name);
        }
    }

    #[test]
    fn unknown_or_blank_codes_fall_back_to_english() {
        assert_eq!(language_name("kn"), "English");
        assert_eq!(language_name(""), "English");
    }
}
